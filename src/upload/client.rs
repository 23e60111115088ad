//! Logo upload endpoint client
//!
//! Multipart POST with the company id in `user_id` and the image in `image`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::time::Duration;

use super::error::{UploadError, UploadResult};
use super::file::LogoFile;

/// Successful upload
#[derive(Debug, Clone, PartialEq)]
pub struct UploadReceipt {
    /// Response body; not interpreted further
    pub response: serde_json::Value,
    pub uploaded_at: DateTime<Utc>,
}

/// Where logos are sent
#[async_trait]
pub trait LogoUploader: Send + Sync {
    async fn upload(&self, company_id: &str, file: &LogoFile) -> UploadResult<UploadReceipt>;
}

/// HTTP upload endpoint
pub struct HttpLogoUploader {
    client: Client,
    url: String,
}

impl HttpLogoUploader {
    pub fn new(url: impl Into<String>, request_timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    fn form(company_id: &str, file: &LogoFile) -> UploadResult<Form> {
        let image = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.content_type)?;

        Ok(Form::new()
            .text("user_id", company_id.to_string())
            .part("image", image))
    }
}

#[async_trait]
impl LogoUploader for HttpLogoUploader {
    async fn upload(&self, company_id: &str, file: &LogoFile) -> UploadResult<UploadReceipt> {
        let form = Self::form(company_id, file)?;

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await;

        if !status.is_success() {
            let message = match body {
                Ok(text) if !text.trim().is_empty() => text,
                _ => status.canonical_reason().unwrap_or("request failed").to_string(),
            };
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let text = body?;
        let response = serde_json::from_str(&text)
            .map_err(|e| UploadError::InvalidResponse(e.to_string()))?;

        Ok(UploadReceipt {
            response,
            uploaded_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_rejects_bad_mime() {
        let mut file = LogoFile::new("logo.png", vec![1]);
        file.content_type = "not a mime type".to_string();
        assert!(matches!(
            HttpLogoUploader::form("7", &file),
            Err(UploadError::Transport(_))
        ));
    }

    #[test]
    fn test_form_builds_for_valid_file() {
        let file = LogoFile::new("logo.png", vec![1, 2]);
        let form = HttpLogoUploader::form("7", &file).unwrap();
        assert!(!form.boundary().is_empty());
    }
}
