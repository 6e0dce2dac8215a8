//! Transient types for the upload pipeline.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// One file received in an upload request.
///
/// Lives only for the duration of the request. The buffer holds the bytes
/// exactly as received; normalization derives a separate buffer from it.
#[derive(Clone, Debug)]
pub struct UploadItem {
    /// Filename as declared by the client.
    pub filename: String,

    /// MIME type as declared by the client.
    pub content_type: String,

    /// Raw file bytes.
    pub data: Bytes,
}

impl UploadItem {
    /// Lowercased extension of the declared filename, if any.
    pub fn extension(&self) -> Option<String> {
        let ext = self.filename.rsplit('.').next()?;
        if ext == self.filename {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

/// Per-file outcome of an upload batch.
///
/// The response array is always ordered by original file index, with
/// successes and failures interleaved as they occurred. Callers must not
/// assume every entry succeeded.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum UploadOutcome {
    #[serde(rename_all = "camelCase")]
    Success {
        file_index: usize,
        url: String,
        public_id: String,
        width: u32,
        height: u32,
        thumbnail: String,
        fingerprint: String,
        /// True when the content matched an existing catalog record and no
        /// remote upload was performed.
        reused: bool,
    },
    #[serde(rename_all = "camelCase")]
    Error { file_index: usize, error: String },
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Success { .. })
    }

    pub fn file_index(&self) -> usize {
        match self {
            UploadOutcome::Success { file_index, .. } => *file_index,
            UploadOutcome::Error { file_index, .. } => *file_index,
        }
    }
}
