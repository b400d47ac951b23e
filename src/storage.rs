pub mod cos;
pub mod memory;

use crate::StorageError;
use crate::settings::{StorageBackend, StorageSettings};
use std::future::Future;
use std::path::Path;

/// Key-value binary storage addressed by bucket and key.
pub trait ObjectStore: Send + Sync {
    fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    fn get(
        &self,
        bucket: &str,
        key: &str,
    ) -> impl Future<Output = Result<Vec<u8>, StorageError>> + Send;

    /// Keys under `prefix`, in the order the backend returns them.
    fn list(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> impl Future<Output = Result<Vec<String>, StorageError>> + Send;

    fn upload_file(
        &self,
        bucket: &str,
        key: &str,
        local_path: &Path,
    ) -> impl Future<Output = Result<(), StorageError>> + Send {
        async move {
            let bytes = tokio::fs::read(local_path).await.map_err(|e| {
                log::error!("Failed to read {}: {}", local_path.display(), e);
                StorageError::IoError(e)
            })?;
            self.put(bucket, key, bytes).await
        }
    }

    fn download_file(
        &self,
        bucket: &str,
        key: &str,
        local_path: &Path,
    ) -> impl Future<Output = Result<(), StorageError>> + Send {
        async move {
            let bytes = self.get(bucket, key).await?;
            tokio::fs::write(local_path, bytes).await?;
            log::info!("Downloaded {}/{} to {}", bucket, key, local_path.display());
            Ok(())
        }
    }
}

/// The backend selected in configuration.
pub enum Store {
    Cos(cos::CosStore),
    Memory(memory::MemoryStore),
}

impl Store {
    pub fn from_settings(settings: &StorageSettings) -> Self {
        match settings.backend {
            StorageBackend::Cos => Store::Cos(cos::CosStore::new(settings)),
            StorageBackend::Memory => {
                Store::Memory(memory::MemoryStore::with_capacity(settings.memory_max_objects))
            }
        }
    }
}

impl ObjectStore for Store {
    async fn put(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        match self {
            Store::Cos(store) => store.put(bucket, key, bytes).await,
            Store::Memory(store) => store.put(bucket, key, bytes).await,
        }
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        match self {
            Store::Cos(store) => store.get(bucket, key).await,
            Store::Memory(store) => store.get(bucket, key).await,
        }
    }

    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, StorageError> {
        match self {
            Store::Cos(store) => store.list(bucket, prefix).await,
            Store::Memory(store) => store.list(bucket, prefix).await,
        }
    }
}
