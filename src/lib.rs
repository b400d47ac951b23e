pub mod generator;
pub mod parser;
pub mod server;
pub mod settings;
pub mod storage;
pub mod utils;

use crate::generator::Generator;
use crate::parser::LineParser;
use serde::Deserialize;
use std::fmt::Display;

/// Highest heading level a word-processing document has a built-in style for.
pub const MAX_SUPPORTED_HEADING_LEVEL: u8 = 9;

/// Converts Markdown-like text into DOCX bytes using pandoc as the document writer.
pub fn convert(markdown_text: &str, cfg: &ConversionConfig) -> Result<Vec<u8>, GenerateError> {
    let parser = LineParser::new(cfg);
    let document = parser.parse(markdown_text);

    log::debug!(
        "Parsed {} blocks from \"{}\"",
        document.len(),
        utils::preview(markdown_text, 20)
    );

    generator::pandoc::PandocDocxGenerator.generate(&document)
}

/// How list markers are removed from bulleted and numbered lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StripPolicy {
    /// Remove the matched `"* "` or `"1. "` marker exactly once.
    #[default]
    LiteralPrefix,
    /// Remove every leading character of the marker's character set
    /// (`*` and space for bullets, `1`, `.` and space for numbered items).
    CharacterSet,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    pub max_heading_level: u8,
    pub strip_policy: StripPolicy,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        ConversionConfig {
            max_heading_level: MAX_SUPPORTED_HEADING_LEVEL,
            strip_policy: StripPolicy::default(),
        }
    }
}

#[derive(Debug)]
pub enum ParseError {
    IoError(std::io::Error),
    OtherError(anyhow::Error),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::IoError(e) => {
                write!(f, "IO error: {}", e)
            }
            ParseError::OtherError(e) => {
                write!(f, "{}", e)
            }
        }
    }
}

impl std::error::Error for ParseError {}

impl From<std::io::Error> for ParseError {
    fn from(err: std::io::Error) -> Self {
        ParseError::IoError(err)
    }
}

#[derive(Debug)]
pub enum GenerateError {
    IoError(std::io::Error),
    PandocError(anyhow::Error),
    OtherError(anyhow::Error),
}

impl Display for GenerateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerateError::IoError(e) => {
                write!(f, "IO error: {}", e)
            }
            GenerateError::PandocError(e) => {
                write!(f, "Pandoc failed: {}", e)
            }
            GenerateError::OtherError(e) => {
                write!(f, "Error: {}", e)
            }
        }
    }
}

impl std::error::Error for GenerateError {}

impl From<std::io::Error> for GenerateError {
    fn from(err: std::io::Error) -> Self {
        GenerateError::IoError(err)
    }
}

#[derive(Debug)]
pub enum StorageError {
    NotFound { bucket: String, key: String },
    IoError(std::io::Error),
    ServiceError(anyhow::Error),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::NotFound { bucket, key } => {
                write!(f, "Object not found: {}/{}", bucket, key)
            }
            StorageError::IoError(e) => {
                write!(f, "IO error: {}", e)
            }
            StorageError::ServiceError(e) => {
                write!(f, "Storage service error: {}", e)
            }
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::IoError(err)
    }
}
