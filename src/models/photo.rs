//! Represents a photo persisted in the catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A single photo in the catalog.
///
/// The catalog stores metadata about assets hosted on the remote media
/// service, not the image bytes themselves. `tags` holds a JSON array
/// encoded as text (SQLite); use [`Photo::tag_list`] to decode it.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Photo {
    /// Internal UUID for DB indexing.
    pub id: Uuid,

    /// Display title.
    pub title: String,

    /// Longer free-form description.
    pub description: String,

    /// JSON-encoded array of tag strings.
    pub tags: String,

    /// Optional reference to the owning category.
    pub category_id: Option<Uuid>,

    /// Canonical URL of the asset on the remote media host.
    pub url: String,

    /// Derived 300x300 crop-to-fill thumbnail URL.
    pub thumbnail_url: String,

    /// Asset identifier assigned by the remote media host.
    pub public_id: String,

    /// Pixel width of the stored asset.
    pub width: i64,

    /// Pixel height of the stored asset.
    pub height: i64,

    /// Number of times the original has been downloaded.
    pub downloads: i64,

    /// SHA-256 hex digest of the uploaded bytes. NULL for legacy rows that
    /// predate content addressing; unique when present.
    pub fingerprint: Option<String>,

    /// When this photo was created.
    pub created_at: DateTime<Utc>,

    /// When this photo was last modified.
    pub updated_at: DateTime<Utc>,
}

impl Photo {
    /// Decode the JSON-encoded tag column. Malformed values read as empty.
    pub fn tag_list(&self) -> Vec<String> {
        serde_json::from_str(&self.tags).unwrap_or_default()
    }
}

/// Wire shape returned by the photo endpoints.
///
/// Field names follow the public API contract of the site frontend
/// (`cloudinary_url`, `cloudinary_public_id`, snake_case timestamps).
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PhotoResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category_id: Option<Uuid>,
    pub cloudinary_url: String,
    pub thumbnail_url: String,
    pub cloudinary_public_id: String,
    pub width: i64,
    pub height: i64,
    pub downloads: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Photo> for PhotoResponse {
    fn from(photo: Photo) -> Self {
        let tags = photo.tag_list();
        Self {
            id: photo.id,
            title: photo.title,
            description: photo.description,
            tags,
            category_id: photo.category_id,
            cloudinary_url: photo.url,
            thumbnail_url: photo.thumbnail_url,
            cloudinary_public_id: photo.public_id,
            width: photo.width,
            height: photo.height,
            downloads: photo.downloads,
            created_at: photo.created_at,
            updated_at: photo.updated_at,
        }
    }
}

/// Body for `POST /api/photos`, sent by the admin frontend after a
/// successful upload with the values the pipeline returned.
#[derive(Deserialize, Debug)]
pub struct CreatePhotoRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub category_id: Option<Uuid>,
    pub cloudinary_url: String,
    pub thumbnail_url: String,
    pub cloudinary_public_id: String,
    #[serde(default)]
    pub width: i64,
    #[serde(default)]
    pub height: i64,
    pub fingerprint: Option<String>,
}

/// Body for `PUT /api/photos/{id}`. Absent fields keep their stored value.
#[derive(Deserialize, Debug, Default)]
pub struct UpdatePhotoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub category_id: Option<Uuid>,
}
