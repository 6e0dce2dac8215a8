//! HTTP handlers for the upload pipeline.
//!
//! Buffers the multipart batch in memory (camera exports are large but
//! bounded by the body limit) and delegates all per-file work to
//! `UploadService`.

use crate::errors::AppError;
use crate::models::upload::UploadItem;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Multipart, State},
    response::IntoResponse,
};
use serde_json::json;

/// Multipart field name carrying the files.
pub const UPLOAD_FIELD: &str = "files";

/// Request body ceiling for the upload route. Matches the 100 MB per-request
/// limit the admin frontend was built against.
pub const MAX_UPLOAD_BODY_BYTES: usize = 100 * 1024 * 1024;

/// `POST /api/upload/photo` — upload a batch of photos.
///
/// Responds 200 with the ordered per-file outcome array when at least one
/// file succeeded; 400/415 on intake violations; 500 when every file failed.
pub async fn upload_photos(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let files = collect_upload_items(&mut multipart).await?;
    tracing::info!(files = files.len(), "upload request received");

    let outcomes = state.uploads.process_batch(files).await?;
    Ok(Json(outcomes))
}

/// Drain the multipart body into `UploadItem`s.
///
/// Only fields named `files` are considered; anything else is skipped so
/// stray form fields don't fail the request.
async fn collect_upload_items(multipart: &mut Multipart) -> Result<Vec<UploadItem>, AppError> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::bad_request(format!("failed to read multipart body: {err}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .unwrap_or("unknown")
            .to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|err| AppError::bad_request(format!("failed to read `{filename}`: {err}")))?;

        files.push(UploadItem {
            filename,
            content_type,
            data,
        });
    }

    Ok(files)
}

/// `GET /api/upload/test-cloudinary` — connectivity probe against the remote
/// media host; returns its ping payload or a connection-failure error.
pub async fn test_cloudinary(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let result = state
        .media_host
        .ping()
        .await
        .map_err(|err| AppError::internal(format!("cloudinary connection failed: {err}")))?;

    Ok(Json(json!({
        "status": "cloudinary connected",
        "result": result,
    })))
}
