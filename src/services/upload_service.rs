//! src/services/upload_service.rs
//!
//! UploadService — the photo upload pipeline. A validated batch is worked
//! through one file at a time: normalize (bounded image envelope), hash the
//! bytes that will actually be stored, check the catalog for identical
//! content, and only then push to the remote media host. Per-file failures
//! are isolated into the result array; the whole batch fails only when
//! intake validation rejects it or when not a single file succeeded.
//!
//! The pipeline reads the catalog but never writes it — persisting a
//! `PhotoRecord` for a fresh upload is the caller's job once it has the
//! returned URL, public id, and fingerprint.

use crate::models::upload::{UploadItem, UploadOutcome};
use crate::services::image_normalizer;
use crate::services::media_host::{MediaHost, MediaHostError};
use crate::services::photo_catalog::{CatalogError, PhotoCatalog};
use bytes::Bytes;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use thiserror::Error;

/// Maximum number of files accepted in one upload request.
pub const MAX_BATCH_FILES: usize = 10;

const ALLOWED_EXTENSIONS: [&str; 7] = ["jpeg", "jpg", "png", "webp", "heic", "tiff", "tif"];
const ALLOWED_CONTENT_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/heic",
    "image/tiff",
];

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("no files uploaded")]
    EmptyBatch,
    #[error("too many files: {0} submitted, limit is {MAX_BATCH_FILES}")]
    TooManyFiles(usize),
    #[error("unsupported file type: `{filename}` ({content_type})")]
    UnsupportedType {
        filename: String,
        content_type: String,
    },
    #[error("all uploads failed: {0}")]
    AllFailed(String),
}

/// Failures that can strike a single file mid-pipeline. Converted into an
/// error entry in the result array, never into a batch abort.
#[derive(Debug, Error)]
enum FileError {
    #[error(transparent)]
    MediaHost(#[from] MediaHostError),
    #[error("catalog lookup failed: {0}")]
    Catalog(#[from] CatalogError),
}

/// Content fingerprint: SHA-256 hex digest of a byte buffer.
///
/// Computed over the bytes as they will be uploaded (post-normalization),
/// so deduplication reflects what is stored remotely rather than what was
/// received.
pub fn fingerprint(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Reject a batch before any per-file work starts.
///
/// A single disallowed extension/MIME pair fails the entire request; both
/// halves of the pair must be in the accepted set. File size is not checked
/// here — oversized images are handled by normalization.
pub fn validate_batch(files: &[UploadItem]) -> Result<(), UploadError> {
    if files.is_empty() {
        return Err(UploadError::EmptyBatch);
    }
    if files.len() > MAX_BATCH_FILES {
        return Err(UploadError::TooManyFiles(files.len()));
    }

    for file in files {
        let extension_ok = file
            .extension()
            .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()));
        let mime = normalize_mime_type(&file.content_type);
        let mime_ok = ALLOWED_CONTENT_TYPES.contains(&mime.as_str());

        if !extension_ok || !mime_ok {
            return Err(UploadError::UnsupportedType {
                filename: file.filename.clone(),
                content_type: file.content_type.clone(),
            });
        }
    }

    Ok(())
}

/// Strip MIME parameters ("image/jpeg; charset=utf-8" -> "image/jpeg").
fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_ascii_lowercase()
}

pub struct UploadService {
    catalog: PhotoCatalog,
    media_host: Arc<dyn MediaHost>,
}

impl UploadService {
    pub fn new(catalog: PhotoCatalog, media_host: Arc<dyn MediaHost>) -> Self {
        Self {
            catalog,
            media_host,
        }
    }

    /// Run a full batch through the pipeline.
    ///
    /// Files are processed strictly in sequence — one in-flight remote
    /// upload at a time keeps the media host within its connection limits.
    /// The returned array is index-aligned with the submitted files, mixing
    /// successes and failures as they occurred. Errors are returned only for
    /// intake violations and for batches where every file failed.
    pub async fn process_batch(
        &self,
        files: Vec<UploadItem>,
    ) -> Result<Vec<UploadOutcome>, UploadError> {
        validate_batch(&files)?;

        let mut outcomes = Vec::with_capacity(files.len());
        let mut failures = Vec::new();

        for (index, file) in files.into_iter().enumerate() {
            match self.process_file(index, &file).await {
                Ok(outcome) => outcomes.push(outcome),
                Err(err) => {
                    tracing::warn!(
                        file_index = index,
                        filename = %file.filename,
                        error = %err,
                        "file upload failed"
                    );
                    let message = err.to_string();
                    failures.push(message.clone());
                    outcomes.push(UploadOutcome::Error {
                        file_index: index,
                        error: message,
                    });
                }
            }
        }

        if !outcomes.iter().any(UploadOutcome::is_success) {
            return Err(UploadError::AllFailed(failures.join("; ")));
        }

        Ok(outcomes)
    }

    /// Per-file state machine:
    /// normalized -> hashed -> {dedup hit | uploading} -> outcome.
    async fn process_file(
        &self,
        index: usize,
        file: &UploadItem,
    ) -> Result<UploadOutcome, FileError> {
        let upload_bytes = self.normalize_for_upload(file).await;
        let fingerprint = fingerprint(&upload_bytes);

        if let Some(existing) = self.catalog.find_by_fingerprint(&fingerprint).await? {
            tracing::info!(
                file_index = index,
                filename = %file.filename,
                fingerprint = %&fingerprint[..12],
                public_id = %existing.public_id,
                "identical content already in catalog, reusing remote asset"
            );
            return Ok(UploadOutcome::Success {
                file_index: index,
                url: existing.url,
                public_id: existing.public_id,
                width: existing.width.max(0) as u32,
                height: existing.height.max(0) as u32,
                thumbnail: existing.thumbnail_url,
                fingerprint,
                reused: true,
            });
        }

        let asset = self.media_host.upload(&file.filename, upload_bytes).await?;
        let thumbnail = self.media_host.thumbnail_url(&asset.public_id);
        tracing::info!(
            file_index = index,
            filename = %file.filename,
            public_id = %asset.public_id,
            width = asset.width,
            height = asset.height,
            "uploaded to media host"
        );

        Ok(UploadOutcome::Success {
            file_index: index,
            url: asset.secure_url,
            public_id: asset.public_id,
            width: asset.width,
            height: asset.height,
            thumbnail,
            fingerprint,
            reused: false,
        })
    }

    /// Produce the bytes that will be uploaded and hashed.
    ///
    /// Normalization runs on the blocking pool; the orchestrator awaits it
    /// before touching the next file. Any failure falls back to the original
    /// buffer — the upload still proceeds on unmodified bytes.
    async fn normalize_for_upload(&self, file: &UploadItem) -> Bytes {
        let original = file.data.clone();
        let input = original.clone();

        match tokio::task::spawn_blocking(move || image_normalizer::normalize(&input)).await {
            Ok(Ok(Some(resized))) => {
                tracing::debug!(
                    filename = %file.filename,
                    original_bytes = original.len(),
                    normalized_bytes = resized.len(),
                    "image normalized for upload"
                );
                Bytes::from(resized)
            }
            Ok(Ok(None)) => original,
            Ok(Err(err)) => {
                tracing::warn!(
                    filename = %file.filename,
                    error = %err,
                    "normalization failed, uploading original bytes"
                );
                original
            }
            Err(err) => {
                tracing::warn!(
                    filename = %file.filename,
                    error = %err,
                    "normalization task aborted, uploading original bytes"
                );
                original
            }
        }
    }
}
