//! Signed uploads to the Cloudinary image CDN.
//!
//! # API Reference
//!
//! - Endpoint: `POST {base}/v1_1/{cloud_name}/image/upload`
//! - Authentication: `api_key` plus a SHA-256 `signature` over the sorted
//!   signed parameters followed by the API secret

use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use url::Url;

use super::{DataUri, ImageError};
use crate::config::{CloudinaryConfig, directory_url};

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// A hosted image.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedImage {
    /// Public HTTPS URL.
    #[serde(rename = "secure_url")]
    pub url: String,
    /// CDN identifier (folder + name).
    pub public_id: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Cloudinary upload client.
#[derive(Clone)]
pub struct CloudinaryClient {
    inner: Arc<CloudinaryClientInner>,
}

struct CloudinaryClientInner {
    client: reqwest::Client,
    upload_url: Url,
    api_key: String,
    api_secret: SecretString,
}

impl CloudinaryClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns error if the upload URL cannot be built or the HTTP client
    /// fails to build.
    pub fn new(config: &CloudinaryConfig) -> Result<Self, ImageError> {
        let upload_url = directory_url(config.base_url.clone())
            .join(&format!("v1_1/{}/image/upload", config.cloud_name))
            .map_err(|e| ImageError::Parse(format!("Invalid upload URL: {e}")))?;

        let client = reqwest::Client::builder().timeout(UPLOAD_TIMEOUT).build()?;

        Ok(Self {
            inner: Arc::new(CloudinaryClientInner {
                client,
                upload_url,
                api_key: config.api_key.clone(),
                api_secret: config.api_secret.clone(),
            }),
        })
    }

    /// Upload an image into `folder`.
    ///
    /// # Errors
    ///
    /// Returns `ImageError::Request` on transport failures and
    /// `ImageError::Api` when the CDN rejects the upload.
    pub async fn upload(&self, image: &DataUri, folder: &str) -> Result<UploadedImage, ImageError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign(
            &[("folder", folder), ("timestamp", timestamp.as_str())],
            self.inner.api_secret.expose_secret(),
        );

        let form = [
            ("file", image.as_str()),
            ("folder", folder),
            ("timestamp", timestamp.as_str()),
            ("api_key", self.inner.api_key.as_str()),
            ("signature", signature.as_str()),
            ("signature_algorithm", "sha256"),
        ];

        let response = self
            .inner
            .client
            .post(self.inner.upload_url.clone())
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(parse_error(response).await);
        }

        let uploaded: UploadedImage = response
            .json()
            .await
            .map_err(|e| ImageError::Parse(format!("Failed to parse upload response: {e}")))?;

        tracing::info!(
            folder,
            public_id = %uploaded.public_id,
            bytes = image.decoded_len(),
            "Image uploaded"
        );
        Ok(uploaded)
    }

    /// Upload several images into `folder`, in order.
    ///
    /// # Errors
    ///
    /// Stops at the first failed upload.
    pub async fn upload_all(
        &self,
        images: &[DataUri],
        folder: &str,
    ) -> Result<Vec<UploadedImage>, ImageError> {
        let mut uploaded = Vec::with_capacity(images.len());
        for image in images {
            uploaded.push(self.upload(image, folder).await?);
        }
        Ok(uploaded)
    }
}

async fn parse_error(response: reqwest::Response) -> ImageError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => parsed.error.message,
        Err(_) if body.is_empty() => "Unknown error".to_string(),
        Err(_) => body,
    };

    ImageError::Api { status, message }
}

/// Upload signature: hex SHA-256 of `k1=v1&k2=v2` (keys sorted) + secret.
fn sign(params: &[(&str, &str)], secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by_key(|(key, _)| *key);

    let to_sign = sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

impl std::fmt::Debug for CloudinaryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryClient")
            .field("upload_url", &self.inner.upload_url.as_str())
            .field("api_key", &self.inner.api_key)
            .finish_non_exhaustive()
    }
}
