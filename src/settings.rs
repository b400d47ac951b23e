//! Layered configuration: an optional TOML file overlaid by `MD2DOCX_*` environment variables.
//!
//! Nested keys use a double underscore, e.g. `MD2DOCX_STORAGE__SECRET_KEY`.

use crate::{ConversionConfig, MAX_SUPPORTED_HEADING_LEVEL};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

const ENV_PREFIX: &str = "MD2DOCX";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub conversion: ConversionConfig,
    pub storage: Option<StorageSettings>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
    pub attachment_name: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            bind: "0.0.0.0:5000".to_owned(),
            attachment_name: "converted_docx.docx".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    Cos,
    Memory,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub region: String,
    pub bucket: String,
    /// Overrides the regional COS endpoint, e.g. for an S3-compatible test server.
    pub endpoint: Option<String>,
    pub path_style: bool,
    /// Converted documents are stored under this key prefix.
    pub key_prefix: String,
    /// Oldest objects are evicted once the memory backend holds this many.
    pub memory_max_objects: usize,
    pub secret_id: String,
    pub secret_key: String,
    pub token: Option<String>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            backend: StorageBackend::default(),
            region: String::new(),
            bucket: String::new(),
            endpoint: None,
            path_style: false,
            key_prefix: "docx".to_owned(),
            memory_max_objects: 1000,
            secret_id: String::new(),
            secret_key: String::new(),
            token: None,
        }
    }
}

impl fmt::Debug for StorageSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageSettings")
            .field("backend", &self.backend)
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("endpoint", &self.endpoint)
            .field("path_style", &self.path_style)
            .field("key_prefix", &self.key_prefix)
            .field("memory_max_objects", &self.memory_max_objects)
            .field("secret_id", &self.secret_id)
            .field("secret_key", &"<redacted>")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Settings {
    /// Loads settings from `path` (skipped if the file does not exist) and the environment.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let level = self.conversion.max_heading_level;
        if !(1..=MAX_SUPPORTED_HEADING_LEVEL).contains(&level) {
            return Err(ConfigError::Message(format!(
                "conversion.max_heading_level must be between 1 and {}, got {}",
                MAX_SUPPORTED_HEADING_LEVEL, level
            )));
        }

        if let Some(storage) = &self.storage {
            if storage.bucket.trim().is_empty() {
                return Err(ConfigError::Message("storage.bucket must be set".to_owned()));
            }
            if storage.backend == StorageBackend::Memory && storage.memory_max_objects == 0 {
                return Err(ConfigError::Message(
                    "storage.memory_max_objects must be at least 1".to_owned(),
                ));
            }
            if storage.backend == StorageBackend::Cos {
                if storage.region.trim().is_empty() && storage.endpoint.is_none() {
                    return Err(ConfigError::Message(
                        "storage.region or storage.endpoint must be set".to_owned(),
                    ));
                }
                if storage.secret_id.is_empty() || storage.secret_key.is_empty() {
                    return Err(ConfigError::Message(
                        "storage.secret_id and storage.secret_key must be set".to_owned(),
                    ));
                }
            }
        }

        Ok(())
    }
}
