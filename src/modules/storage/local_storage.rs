use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, info};

use super::PhotoStorage;
use crate::core::error::AppError;
use crate::shared::validation::STORED_PHOTO_NAME_REGEX;

/// Photos kept as plain files inside one upload directory
pub struct LocalPhotoStorage {
    root: PathBuf,
}

impl LocalPhotoStorage {
    /// Open the upload directory, creating it if missing
    pub async fn new(root: PathBuf) -> Result<Self, AppError> {
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::Storage(format!(
                "Failed to create upload directory '{}': {}",
                root.display(),
                e
            ))
        })?;

        info!("Local photo storage initialized at {}", root.display());
        Ok(Self { root })
    }

    #[cfg(test)]
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    /// Only names produced by the photo naming scheme resolve to a path
    fn path_for(&self, name: &str) -> Result<PathBuf, AppError> {
        if !STORED_PHOTO_NAME_REGEX.is_match(name) {
            return Err(AppError::Storage(format!(
                "Refusing unexpected photo name '{}'",
                name
            )));
        }
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl PhotoStorage for LocalPhotoStorage {
    async fn save(&self, name: &str, data: &[u8], _content_type: &str) -> Result<(), AppError> {
        let path = self.path_for(name)?;
        fs::write(&path, data).await.map_err(|e| {
            AppError::Storage(format!("Failed to write photo '{}': {}", path.display(), e))
        })?;
        debug!("Stored photo '{}' ({} bytes)", name, data.len());
        Ok(())
    }

    async fn load(&self, name: &str) -> Result<Option<Vec<u8>>, AppError> {
        let path = self.path_for(name)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to read photo '{}': {}",
                path.display(),
                e
            ))),
        }
    }

    async fn delete(&self, name: &str) -> Result<bool, AppError> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Deleted photo '{}'", name);
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to delete photo '{}': {}",
                path.display(),
                e
            ))),
        }
    }

    fn backend(&self) -> &'static str {
        "local"
    }
}
