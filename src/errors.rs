use crate::services::media_host::MediaHostError;
use crate::services::photo_catalog::CatalogError;
use crate::services::upload_service::UploadError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// A lightweight wrapper for general errors that keeps the message local.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    /// Shortcut for 400 Bad Request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    /// Shortcut for 401 Unauthorized
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::internal(err.to_string())
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        let status = match &err {
            UploadError::EmptyBatch | UploadError::TooManyFiles(_) => StatusCode::BAD_REQUEST,
            UploadError::UnsupportedType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            UploadError::AllFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        AppError::new(status, err.to_string())
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        let status = match &err {
            CatalogError::PhotoNotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::DuplicateFingerprint(_) => StatusCode::CONFLICT,
            CatalogError::Sqlx(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        AppError::new(status, err.to_string())
    }
}

impl From<MediaHostError> for AppError {
    fn from(err: MediaHostError) -> Self {
        AppError::internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_errors_map_to_intake_and_batch_statuses() {
        let err: AppError = UploadError::EmptyBatch.into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err: AppError = UploadError::UnsupportedType {
            filename: "notes.txt".into(),
            content_type: "text/plain".into(),
        }
        .into();
        assert_eq!(err.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let err: AppError = UploadError::AllFailed("everything broke".into()).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.message.contains("everything broke"));
    }

    #[test]
    fn duplicate_fingerprint_maps_to_conflict() {
        let err: AppError = CatalogError::DuplicateFingerprint("abc".into()).into();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }
}
