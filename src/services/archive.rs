use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use time::Date;

use super::{sanitize_name, ServiceError};
use crate::config::ArchiveConfig;

const SOURCE_APP: &str = "training";

/// Client for the HTTP gateway that files PDFs into per-employee Drive
/// folders. Callers treat every operation as best-effort enrichment: the
/// local record is authoritative whether or not archival succeeds.
pub struct ArchiveClient {
    http: reqwest::Client,
    config: ArchiveConfig,
}

pub struct ArchiveUpload {
    pub employee_name: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub subfolder: String,
}

#[derive(Debug, Serialize)]
struct GatewayRequest<'a> {
    action: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    employee_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mime_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subfolder: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    old_file_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    folder_id: Option<&'a str>,
    source_app: &'a str,
}

impl<'a> GatewayRequest<'a> {
    fn new(action: &'a str) -> Self {
        Self {
            action,
            employee_name: None,
            file_name: None,
            file_base64: None,
            mime_type: None,
            subfolder: None,
            old_file_id: None,
            file_id: None,
            folder_id: None,
            source_app: SOURCE_APP,
        }
    }

    fn with_upload(mut self, upload: &'a ArchiveUpload) -> Self {
        self.employee_name = Some(&upload.employee_name);
        self.file_name = Some(&upload.file_name);
        self.file_base64 = Some(BASE64.encode(&upload.bytes));
        self.mime_type = Some(&upload.mime_type);
        self.subfolder = Some(&upload.subfolder);
        self
    }
}

#[derive(Debug, Deserialize)]
pub struct ArchiveResult {
    pub file_id: String,
    pub web_view_link: String,
    pub folder_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GatewayError {
    error: Option<String>,
}

impl ArchiveClient {
    pub fn new(http: reqwest::Client, config: ArchiveConfig) -> Self {
        Self { http, config }
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        request: &GatewayRequest<'_>,
    ) -> Result<T, ServiceError> {
        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(self.config.bearer_token.expose_secret())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<GatewayError>().await {
                Ok(body) => body
                    .error
                    .unwrap_or_else(|| "Archive operation failed".to_string()),
                Err(_) => "Archive operation failed".to_string(),
            };
            return Err(ServiceError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }

    pub async fn upload(&self, upload: &ArchiveUpload) -> Result<ArchiveResult, ServiceError> {
        self.call(&GatewayRequest::new("upload").with_upload(upload))
            .await
    }

    /// Replace a previously archived file, keeping the folder layout.
    #[allow(unused)]
    pub async fn replace(
        &self,
        old_file_id: &str,
        upload: &ArchiveUpload,
    ) -> Result<ArchiveResult, ServiceError> {
        let mut request = GatewayRequest::new("replace").with_upload(upload);
        request.old_file_id = Some(old_file_id);
        self.call(&request).await
    }

    #[allow(unused)]
    pub async fn delete_file(&self, file_id: &str) -> Result<(), ServiceError> {
        let mut request = GatewayRequest::new("delete_file");
        request.file_id = Some(file_id);
        self.call::<serde_json::Value>(&request).await.map(|_| ())
    }

    #[allow(unused)]
    pub async fn delete_folder(&self, folder_id: &str) -> Result<(), ServiceError> {
        let mut request = GatewayRequest::new("delete_folder");
        request.folder_id = Some(folder_id);
        self.call::<serde_json::Value>(&request).await.map(|_| ())
    }
}

/// `<kind>_<trainee>_<module>_<yyyymmdd>.pdf` with non-alphanumerics
/// stripped, matching the archive's naming convention.
pub fn drive_file_name(kind: &str, trainee_name: &str, module_name: &str, date: Date) -> String {
    format!(
        "{}_{}_{}_{:04}{:02}{:02}.pdf",
        kind,
        sanitize_name(trainee_name),
        sanitize_name(module_name),
        date.year(),
        date.month() as u8,
        date.day()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn drive_file_name_strips_specials_and_formats_date() {
        assert_eq!(
            drive_file_name(
                "Training",
                "Jo O'Neill",
                "Fire Safety (v2)",
                date!(2024 - 03 - 05)
            ),
            "Training_Jo ONeill_Fire Safety v2_20240305.pdf"
        );
    }
}
