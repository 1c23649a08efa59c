use reqwest::header::CONTENT_TYPE;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;

use super::ServiceError;
use crate::config::StorageConfig;

/// Client for the bucket-style object store (module source PDFs, auxiliary
/// module files, assessment proof scans).
pub struct StorageClient {
    http: reqwest::Client,
    config: StorageConfig,
}

#[derive(Debug, Deserialize)]
struct SignedUrlResponse {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

impl StorageClient {
    pub fn new(http: reqwest::Client, config: StorageConfig) -> Self {
        Self { http, config }
    }

    pub fn materials_bucket(&self) -> &str {
        &self.config.materials_bucket
    }

    pub fn scans_bucket(&self) -> &str {
        &self.config.scans_bucket
    }

    fn object_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/object/{}/{}",
            self.config.endpoint.trim_end_matches('/'),
            bucket,
            path
        )
    }

    /// Store an object and return its path within the bucket.
    pub async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        mime_type: &str,
        upsert: bool,
    ) -> Result<String, ServiceError> {
        let response = self
            .http
            .post(self.object_url(bucket, path))
            .bearer_auth(self.config.service_key.expose_secret())
            .header(CONTENT_TYPE, mime_type)
            .header("x-upsert", if upsert { "true" } else { "false" })
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::Api {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }
        Ok(path.to_string())
    }

    /// Time-limited download URL for an object.
    pub async fn signed_url(
        &self,
        bucket: &str,
        path: &str,
        ttl_seconds: u32,
    ) -> Result<String, ServiceError> {
        let url = format!(
            "{}/object/sign/{}/{}",
            self.config.endpoint.trim_end_matches('/'),
            bucket,
            path
        );
        let response = self
            .http
            .post(url)
            .bearer_auth(self.config.service_key.expose_secret())
            .json(&json!({ "expiresIn": ttl_seconds }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::Api {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }
        let body: SignedUrlResponse = response.json().await?;
        Ok(format!(
            "{}{}",
            self.config.endpoint.trim_end_matches('/'),
            body.signed_url
        ))
    }

    pub async fn remove(&self, bucket: &str, path: &str) -> Result<(), ServiceError> {
        let response = self
            .http
            .delete(self.object_url(bucket, path))
            .bearer_auth(self.config.service_key.expose_secret())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::Api {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }
        Ok(())
    }
}
