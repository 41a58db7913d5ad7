//! Blob storage client for merchant and product images
//!
//! Talks to the hosted storage HTTP API: upload a blob under a bucket and
//! get its public URL back, or delete a blob by key. Image transcoding is
//! not this service's concern; blobs are stored as received.

use reqwest::Client;

use crate::error::{AppError, AppResult};

/// Buckets this service is allowed to touch
pub const ALLOWED_BUCKETS: &[&str] = &["merchants", "products"];

/// Blob storage API client
#[derive(Clone)]
pub struct StorageClient {
    client: Client,
    base_url: String,
    service_key: String,
}

impl StorageClient {
    /// Create a new StorageClient
    pub fn new(base_url: String, service_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            service_key,
        }
    }

    /// Check a bucket against the allow-list
    pub fn validate_bucket(bucket: &str) -> AppResult<()> {
        if ALLOWED_BUCKETS.contains(&bucket) {
            Ok(())
        } else {
            Err(AppError::Validation {
                field: "bucket".to_string(),
                message: format!("Bucket '{}' is not allowed", bucket),
                message_id: format!("Bucket '{}' tidak diizinkan", bucket),
            })
        }
    }

    /// Public URL of a stored object
    pub fn public_url(&self, bucket: &str, file_name: &str) -> String {
        format!("{}/object/public/{}/{}", self.base_url, bucket, file_name)
    }

    /// Upload a blob and return its public URL
    pub async fn upload(
        &self,
        bucket: &str,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> AppResult<String> {
        Self::validate_bucket(bucket)?;

        let url = format!("{}/object/{}/{}", self.base_url, bucket, file_name);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.service_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| AppError::StorageError(format!("upload request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::StorageError(format!(
                "upload rejected: {} - {}",
                status, body
            )));
        }

        Ok(self.public_url(bucket, file_name))
    }

    /// Delete a blob by bucket and key
    pub async fn delete(&self, bucket: &str, file_name: &str) -> AppResult<()> {
        Self::validate_bucket(bucket)?;

        let url = format!("{}/object/{}/{}", self.base_url, bucket, file_name);

        let response = self
            .client
            .delete(&url)
            .bearer_auth(&self.service_key)
            .send()
            .await
            .map_err(|e| AppError::StorageError(format!("delete request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::StorageError(format!(
                "delete rejected: {} - {}",
                status, body
            )));
        }

        Ok(())
    }
}
