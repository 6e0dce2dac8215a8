//! src/services/media_host.rs
//!
//! Remote media host adapter. The portfolio stores only catalog metadata;
//! image bytes live on a Cloudinary-style service reachable through an
//! upload API and a URL-transform API. The adapter is injected as a trait
//! object so the pipeline can run against an in-memory double in tests.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Ceiling for a single remote upload request.
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Logical folder all portfolio photos land in on the remote host.
pub const UPLOAD_FOLDER: &str = "photos";

/// Fixed crop-to-fill transform used for catalog thumbnails.
const THUMBNAIL_TRANSFORM: &str = "c_fill,h_300,w_300";

/// Asset descriptor returned by the remote host after a successful upload.
#[derive(Deserialize, Clone, Debug)]
pub struct RemoteAsset {
    pub secure_url: String,
    pub public_id: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Error)]
pub enum MediaHostError {
    /// Per-file upload failure; scoped to one file, never the batch.
    #[error("upload of `{filename}` failed: {detail}")]
    Upload { filename: String, detail: String },
    #[error("media host request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("media host returned {status}: {detail}")]
    Rejected { status: u16, detail: String },
}

/// Remote media-hosting service seam.
#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Upload one file's bytes; errors carry the original filename.
    async fn upload(&self, filename: &str, data: Bytes) -> Result<RemoteAsset, MediaHostError>;

    /// Delivery URL for a fixed 300x300 crop-to-fill rendition of an asset.
    fn thumbnail_url(&self, public_id: &str) -> String;

    /// Connectivity probe; returns the host's ping payload.
    async fn ping(&self) -> Result<serde_json::Value, MediaHostError>;
}

/// Credentials and endpoints for the hosted Cloudinary-style service.
#[derive(Clone, Debug)]
pub struct MediaHostSettings {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub api_base: String,
    pub delivery_base: String,
}

/// HTTP implementation of [`MediaHost`].
///
/// Holds an explicitly constructed client handle instead of mutating
/// process-wide configuration, so call sites decide which instance (or
/// double) they talk to.
pub struct CloudinaryClient {
    http: reqwest::Client,
    settings: MediaHostSettings,
}

impl CloudinaryClient {
    pub fn new(settings: MediaHostSettings) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(UPLOAD_TIMEOUT).build()?;
        Ok(Self { http, settings })
    }

    fn upload_endpoint(&self) -> String {
        format!(
            "{}/{}/image/upload",
            self.settings.api_base, self.settings.cloud_name
        )
    }

    async fn send_upload(&self, filename: &str, data: Bytes) -> Result<RemoteAsset, MediaHostError> {
        let part = reqwest::multipart::Part::stream(reqwest::Body::from(data))
            .file_name(filename.to_string());
        let form = reqwest::multipart::Form::new()
            .text("folder", UPLOAD_FOLDER)
            .text("quality", "auto")
            .part("file", part);

        let response = self
            .http
            .post(self.upload_endpoint())
            .basic_auth(&self.settings.api_key, Some(&self.settings.api_secret))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(MediaHostError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(response.json::<RemoteAsset>().await?)
    }
}

#[async_trait]
impl MediaHost for CloudinaryClient {
    async fn upload(&self, filename: &str, data: Bytes) -> Result<RemoteAsset, MediaHostError> {
        self.send_upload(filename, data)
            .await
            .map_err(|err| MediaHostError::Upload {
                filename: filename.to_string(),
                detail: err.to_string(),
            })
    }

    fn thumbnail_url(&self, public_id: &str) -> String {
        format!(
            "{}/{}/image/upload/{}/{}",
            self.settings.delivery_base, self.settings.cloud_name, THUMBNAIL_TRANSFORM, public_id
        )
    }

    async fn ping(&self) -> Result<serde_json::Value, MediaHostError> {
        let url = format!("{}/{}/ping", self.settings.api_base, self.settings.cloud_name);
        let response = self
            .http
            .get(&url)
            .basic_auth(&self.settings.api_key, Some(&self.settings.api_secret))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(MediaHostError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> MediaHostSettings {
        MediaHostSettings {
            cloud_name: "demo".into(),
            api_key: "key".into(),
            api_secret: "secret".into(),
            api_base: "https://api.cloudinary.com/v1_1".into(),
            delivery_base: "https://res.cloudinary.com".into(),
        }
    }

    #[test]
    fn thumbnail_url_uses_fixed_crop_transform() {
        let client = CloudinaryClient::new(settings()).unwrap();
        assert_eq!(
            client.thumbnail_url("photos/abc123"),
            "https://res.cloudinary.com/demo/image/upload/c_fill,h_300,w_300/photos/abc123"
        );
    }

    #[test]
    fn upload_error_names_the_file() {
        let err = MediaHostError::Upload {
            filename: "dsc_0042.jpg".into(),
            detail: "media host returned 500: boom".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("dsc_0042.jpg"));
        assert!(msg.contains("500"));
    }
}
