use super::ObjectStore;
use crate::StorageError;
use crate::settings::StorageSettings;

use anyhow::anyhow;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region, RequestChecksumCalculation};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;

const CREDENTIALS_PROVIDER: &str = "md2docx-settings";

/// Tencent Cloud Object Storage, spoken to through its S3-compatible API.
pub struct CosStore {
    client: Client,
}

impl CosStore {
    pub fn new(settings: &StorageSettings) -> Self {
        let credentials = Credentials::new(
            &settings.secret_id,
            &settings.secret_key,
            settings.token.clone(),
            None,
            CREDENTIALS_PROVIDER,
        );

        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .endpoint_url(endpoint_url(settings))
            .credentials_provider(credentials)
            .force_path_style(settings.path_style)
            // COS rejects the default trailing checksums
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
            .build();

        CosStore {
            client: Client::from_conf(config),
        }
    }
}

pub fn endpoint_url(settings: &StorageSettings) -> String {
    match settings.endpoint.as_deref() {
        Some(endpoint) => endpoint.to_owned(),
        None => format!("https://cos.{}.myqcloud.com", settings.region),
    }
}

impl ObjectStore for CosStore {
    async fn put(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        let output = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| {
                log::error!("Upload of {}/{} failed: {}", bucket, key, DisplayErrorContext(&e));
                StorageError::ServiceError(anyhow!("{}", DisplayErrorContext(&e)))
            })?;

        log::info!(
            "Uploaded {}/{}: ETag {}",
            bucket,
            key,
            output.e_tag().unwrap_or("<none>")
        );
        Ok(())
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    return StorageError::NotFound {
                        bucket: bucket.to_owned(),
                        key: key.to_owned(),
                    };
                }
                log::error!("Download of {}/{} failed: {}", bucket, key, DisplayErrorContext(&e));
                StorageError::ServiceError(anyhow!("{}", DisplayErrorContext(&e)))
            })?;

        let data = output.body.collect().await.map_err(|e| {
            log::error!("Reading body of {}/{} failed: {}", bucket, key, e);
            StorageError::ServiceError(anyhow!("{}", e))
        })?;

        Ok(data.into_bytes().to_vec())
    }

    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .into_paginator()
            .send();

        let mut keys = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| {
                log::error!("Listing {}/{} failed: {}", bucket, prefix, DisplayErrorContext(&e));
                StorageError::ServiceError(anyhow!("{}", DisplayErrorContext(&e)))
            })?;
            keys.extend(page.contents().iter().filter_map(|o| o.key()).map(str::to_owned));
        }

        Ok(keys)
    }
}
