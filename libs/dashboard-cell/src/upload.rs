use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use shared_config::AppConfig;

use crate::error::ClientError;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    url: Option<String>,
}

/// Unsigned image upload to a Cloudinary preset.
#[derive(Clone)]
pub struct CloudinaryUploader {
    client: Client,
    base_url: String,
    cloud_name: String,
    upload_preset: String,
}

impl CloudinaryUploader {
    pub fn new(base_url: &str, cloud_name: &str, upload_preset: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            cloud_name: cloud_name.to_string(),
            upload_preset: upload_preset.to_string(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            &config.cloudinary_base_url,
            &config.cloudinary_cloud_name,
            &config.cloudinary_upload_preset,
        )
    }

    fn upload_url(&self) -> String {
        format!("{}/v1_1/{}/image/upload", self.base_url, self.cloud_name)
    }

    /// Returns the hosted URL of the stored image.
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, ClientError> {
        if self.cloud_name.is_empty() || self.upload_preset.is_empty() {
            return Err(ClientError::Upload("image upload is not configured".to_string()));
        }

        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name.to_string()))
            .text("upload_preset", self.upload_preset.clone());

        debug!("Uploading {} to {}", file_name, self.upload_url());
        let response = self.client.post(self.upload_url()).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Image upload rejected ({}): {}", status, body);
            return Err(ClientError::Upload(format!("status {}", status.as_u16())));
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;

        uploaded
            .secure_url
            .or(uploaded.url)
            .ok_or_else(|| ClientError::Upload("response carried no image url".to_string()))
    }
}
