//! HTTP handlers for the photo catalog.
//!
//! The admin frontend calls `POST /api/photos` after a successful upload,
//! passing through the URL, public id, dimensions, and fingerprint the
//! pipeline returned. Public routes serve the gallery.

use crate::{
    errors::AppError,
    models::photo::{CreatePhotoRequest, PhotoResponse, UpdatePhotoRequest},
    services::photo_catalog::{NewPhoto, PhotoChanges, PhotoFilter},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

/// Query params accepted by `GET /api/photos`.
#[derive(Debug, Deserialize)]
pub struct ListPhotosQuery {
    pub category: Option<Uuid>,
    pub search: Option<String>,
}

/// `GET /api/photos` — list photos, newest first.
pub async fn list_photos(
    State(state): State<AppState>,
    Query(q): Query<ListPhotosQuery>,
) -> Result<impl IntoResponse, AppError> {
    let photos = state
        .catalog
        .list(PhotoFilter {
            category: q.category,
            search: q.search,
        })
        .await?;

    let body: Vec<PhotoResponse> = photos.into_iter().map(PhotoResponse::from).collect();
    Ok(Json(body))
}

/// `GET /api/photos/{id}` — fetch a single photo.
pub async fn get_photo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let photo = state.catalog.get(id).await?;
    Ok(Json(PhotoResponse::from(photo)))
}

/// `POST /api/photos` — persist a catalog record for an uploaded asset.
///
/// A duplicate fingerprint means another record already owns this content
/// (first writer wins) and is answered with 409.
pub async fn create_photo(
    State(state): State<AppState>,
    Json(payload): Json<CreatePhotoRequest>,
) -> Result<impl IntoResponse, AppError> {
    let photo = state
        .catalog
        .insert(NewPhoto {
            title: payload.title,
            description: payload.description,
            tags: payload.tags,
            category_id: payload.category_id,
            url: payload.cloudinary_url,
            thumbnail_url: payload.thumbnail_url,
            public_id: payload.cloudinary_public_id,
            width: payload.width,
            height: payload.height,
            fingerprint: payload.fingerprint,
        })
        .await?;

    Ok(Json(PhotoResponse::from(photo)))
}

/// `PUT /api/photos/{id}` — partial metadata update.
pub async fn update_photo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePhotoRequest>,
) -> Result<impl IntoResponse, AppError> {
    let photo = state
        .catalog
        .update(
            id,
            PhotoChanges {
                title: payload.title,
                description: payload.description,
                tags: payload.tags,
                category_id: payload.category_id,
            },
        )
        .await?;

    Ok(Json(PhotoResponse::from(photo)))
}

/// `DELETE /api/photos/{id}` — remove a catalog record.
pub async fn delete_photo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.catalog.delete(id).await?;
    Ok(Json(json!({ "message": "Photo deleted" })))
}
