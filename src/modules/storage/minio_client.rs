//! MinIO/S3-compatible photo storage
//!
//! Photos live under a single key prefix in one bucket. Uses rust-s3 for
//! lightweight S3 operations.

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use tracing::{debug, info, warn};

use super::PhotoStorage;
use crate::core::config::MinIOConfig;
use crate::core::error::AppError;

/// MinIO/S3-compatible storage client
pub struct MinIOClient {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    endpoint: String,
    prefix: String,
}

impl MinIOClient {
    /// Create a new MinIO client from configuration and make sure the bucket exists
    pub async fn new(config: MinIOConfig) -> Result<Self, AppError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Storage(format!("Failed to create MinIO credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| AppError::Storage(format!("Failed to create MinIO bucket: {}", e)))?;

        // Use path-style URLs for MinIO (http://endpoint/bucket instead of http://bucket.endpoint)
        bucket.set_path_style();

        let client = Self {
            bucket,
            region,
            credentials,
            endpoint: config.endpoint,
            prefix: config.prefix,
        };

        client.ensure_bucket_exists().await?;

        info!(
            "MinIO photo storage initialized for endpoint: {}, bucket: {}, prefix: {}",
            client.endpoint,
            client.bucket.name(),
            client.prefix
        );

        Ok(client)
    }

    /// Ensure the bucket exists, create if not
    async fn ensure_bucket_exists(&self) -> Result<(), AppError> {
        match self.create_bucket().await {
            Ok(_) => {
                info!("Bucket '{}' created successfully", self.bucket.name());
                Ok(())
            }
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                    || error_str.contains("already own it")
                {
                    debug!("Bucket '{}' already exists", self.bucket.name());
                } else {
                    warn!(
                        "Could not create bucket '{}': {}. Assuming it exists.",
                        self.bucket.name(),
                        e
                    );
                }
                Ok(())
            }
        }
    }

    async fn create_bucket(&self) -> Result<(), AppError> {
        Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await
        .map_err(|e| {
            AppError::Storage(format!(
                "Failed to create bucket '{}': {}",
                self.bucket.name(),
                e
            ))
        })?;
        Ok(())
    }

    /// Object key for a stored photo name
    fn key_for(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.prefix, name)
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, AppError> {
        match self.bucket.head_object(key).await {
            Ok((_, status)) => Ok((200..300).contains(&status)),
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("404") || error_str.contains("NoSuchKey") {
                    Ok(false)
                } else {
                    Err(AppError::Storage(format!(
                        "Failed to check if photo '{}' exists: {}",
                        key, e
                    )))
                }
            }
        }
    }
}

#[async_trait]
impl PhotoStorage for MinIOClient {
    async fn save(&self, name: &str, data: &[u8], content_type: &str) -> Result<(), AppError> {
        let key = self.key_for(name);
        let response = self
            .bucket
            .put_object_with_content_type(&key, data, content_type)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload photo '{}': {}", key, e)))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(AppError::Storage(format!(
                "Failed to upload photo '{}': HTTP {}",
                key, status
            )));
        }

        debug!("Uploaded photo '{}' to bucket '{}'", key, self.bucket.name());
        Ok(())
    }

    async fn load(&self, name: &str) -> Result<Option<Vec<u8>>, AppError> {
        let key = self.key_for(name);
        match self.bucket.get_object(&key).await {
            Ok(response) if response.status_code() == 404 => Ok(None),
            Ok(response) if (200..300).contains(&response.status_code()) => {
                Ok(Some(response.to_vec()))
            }
            Ok(response) => Err(AppError::Storage(format!(
                "Failed to download photo '{}': HTTP {}",
                key,
                response.status_code()
            ))),
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("404") || error_str.contains("NoSuchKey") {
                    Ok(None)
                } else {
                    Err(AppError::Storage(format!(
                        "Failed to download photo '{}': {}",
                        key, e
                    )))
                }
            }
        }
    }

    async fn delete(&self, name: &str) -> Result<bool, AppError> {
        let key = self.key_for(name);

        // S3 deletes are idempotent, so existence has to be checked first
        if !self.exists(&key).await? {
            return Ok(false);
        }

        self.bucket
            .delete_object(&key)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to delete photo '{}': {}", key, e)))?;

        debug!(
            "Deleted photo '{}' from bucket '{}'",
            key,
            self.bucket.name()
        );
        Ok(true)
    }

    fn backend(&self) -> &'static str {
        "minio"
    }
}
