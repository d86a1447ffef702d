//! Storage module for issue photos
//!
//! Photos are addressed by the hashed storage name kept on the issue row.
//! Two backends are provided: a local upload directory and a MinIO/S3 bucket.

mod local_storage;
mod minio_client;

#[cfg(test)]
pub(crate) mod memory;

use async_trait::async_trait;
use std::sync::Arc;

use crate::core::config::StorageConfig;
use crate::core::error::AppError;

pub use local_storage::LocalPhotoStorage;
pub use minio_client::MinIOClient;

/// Blob store for issue photos
#[async_trait]
pub trait PhotoStorage: Send + Sync {
    /// Persist bytes under `name`, replacing any existing object
    async fn save(&self, name: &str, data: &[u8], content_type: &str) -> Result<(), AppError>;

    /// Read the bytes stored under `name`, `None` if nothing is stored
    async fn load(&self, name: &str) -> Result<Option<Vec<u8>>, AppError>;

    /// Remove `name`; returns whether something was removed
    async fn delete(&self, name: &str) -> Result<bool, AppError>;

    /// Short backend label for logs
    fn backend(&self) -> &'static str;
}

/// Build the configured backend, creating the directory or bucket if needed
pub async fn from_config(config: &StorageConfig) -> Result<Arc<dyn PhotoStorage>, AppError> {
    match config {
        StorageConfig::Local { upload_dir } => {
            let storage = LocalPhotoStorage::new(upload_dir.clone()).await?;
            Ok(Arc::new(storage))
        }
        StorageConfig::MinIO(minio) => {
            let client = MinIOClient::new(minio.clone()).await?;
            Ok(Arc::new(client))
        }
    }
}
