//! Client for the external image host.
//!
//! Listing photos are uploaded straight to a Cloudinary-compatible endpoint
//! using an unsigned upload preset. A batch of uploads is fanned out on a
//! `JoinSet` and joined; the first failure fails the whole batch and the
//! uploads still in flight are aborted when the set is dropped.

use crate::config::settings::ImageHostConfig;
use crate::models::listing::MAX_IMAGES;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

#[derive(Debug, thiserror::Error)]
pub enum ImageHostError {
    #[error("No images selected")]
    EmptyBatch,

    #[error("Too many images: {selected} selected, at most {limit} allowed")]
    TooManyImages { selected: usize, limit: usize },

    #[error("Unsupported image type: {0}")]
    UnsupportedType(String),

    #[error("Could not read image: {0}")]
    Io(#[from] std::io::Error),

    #[error("Upload request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Image host rejected upload ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Image host response did not include a secure URL")]
    MissingUrl,

    #[error("Upload task failed: {0}")]
    TaskFailed(String),
}

/// An image selected for upload.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Reads an image from disk, inferring its content type from the extension.
    pub async fn from_path(path: &Path) -> Result<Self, ImageHostError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let content_type = match extension.as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "gif" => "image/gif",
            "webp" => "image/webp",
            other => return Err(ImageHostError::UnsupportedType(other.to_string())),
        };

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();
        let bytes = tokio::fs::read(path).await?;

        Ok(Self::new(file_name, content_type, bytes))
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadErrorBody {
    error: UploadErrorDetail,
}

#[derive(Debug, Deserialize)]
struct UploadErrorDetail {
    message: String,
}

#[derive(Clone)]
pub struct ImageHost {
    client: reqwest::Client,
    config: Arc<ImageHostConfig>,
}

impl ImageHost {
    pub fn new(config: ImageHostConfig) -> Result<Self, ImageHostError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    pub fn upload_url(&self) -> String {
        format!(
            "{}/v1_1/{}/image/upload",
            self.config.base_url.trim_end_matches('/'),
            self.config.cloud_name
        )
    }

    /// Uploads one image and returns its secure retrieval URL.
    pub async fn upload(&self, file: ImageFile) -> Result<String, ImageHostError> {
        if !file.content_type.starts_with("image/") {
            return Err(ImageHostError::UnsupportedType(file.content_type));
        }

        let file_name = file.file_name.clone();
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.content_type)?;
        let form = Form::new()
            .part("file", part)
            .text("upload_preset", self.config.upload_preset.clone());

        let response = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<UploadErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            tracing::warn!(file = %file_name, status = status.as_u16(), "Image upload rejected");
            return Err(ImageHostError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: UploadResponse = response.json().await?;
        let url = body
            .secure_url
            .filter(|u| !u.is_empty())
            .ok_or(ImageHostError::MissingUrl)?;

        tracing::debug!(file = %file_name, url = %url, "Image uploaded");
        Ok(url)
    }

    /// Uploads a batch concurrently. URLs come back in the order of `files`.
    pub async fn upload_all(&self, files: Vec<ImageFile>) -> Result<Vec<String>, ImageHostError> {
        if files.is_empty() {
            return Err(ImageHostError::EmptyBatch);
        }
        if files.len() > MAX_IMAGES {
            return Err(ImageHostError::TooManyImages {
                selected: files.len(),
                limit: MAX_IMAGES,
            });
        }

        let count = files.len();
        let mut uploads = JoinSet::new();
        for (index, file) in files.into_iter().enumerate() {
            let host = self.clone();
            uploads.spawn(async move { host.upload(file).await.map(|url| (index, url)) });
        }

        let mut urls: Vec<Option<String>> = vec![None; count];
        while let Some(joined) = uploads.join_next().await {
            let (index, url) = joined.map_err(|e| ImageHostError::TaskFailed(e.to_string()))??;
            if let Some(slot) = urls.get_mut(index) {
                *slot = Some(url);
            }
        }

        Ok(urls.into_iter().flatten().collect())
    }
}
