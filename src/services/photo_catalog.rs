//! src/services/photo_catalog.rs
//!
//! PhotoCatalog — persisted photo metadata backed by SQLite. The catalog is
//! the system of record for assets already pushed to the remote media host:
//! the upload pipeline reads it for fingerprint deduplication, and the photo
//! endpoints write it after a successful upload. Image bytes never touch
//! this service.

use crate::models::photo::Photo;
use chrono::Utc;
use sqlx::{sqlite::Sqlite, QueryBuilder, SqlitePool};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("photo `{0}` not found")]
    PhotoNotFound(Uuid),
    #[error("a photo with fingerprint `{0}` already exists")]
    DuplicateFingerprint(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Column list shared by every query that materializes a [`Photo`].
const PHOTO_COLUMNS: &str = "id, title, description, tags, category_id, url, thumbnail_url, \
     public_id, width, height, downloads, fingerprint, created_at, updated_at";

/// Fields required to create a catalog record.
#[derive(Clone, Debug)]
pub struct NewPhoto {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category_id: Option<Uuid>,
    pub url: String,
    pub thumbnail_url: String,
    pub public_id: String,
    pub width: i64,
    pub height: i64,
    pub fingerprint: Option<String>,
}

/// Partial update; `None` keeps the stored value.
#[derive(Clone, Debug, Default)]
pub struct PhotoChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub category_id: Option<Uuid>,
}

/// Listing filters accepted by `GET /api/photos`.
#[derive(Clone, Debug, Default)]
pub struct PhotoFilter {
    pub category: Option<Uuid>,
    pub search: Option<String>,
}

#[derive(Clone)]
pub struct PhotoCatalog {
    /// Shared SQLite connection pool used for metadata operations.
    pub db: Arc<SqlitePool>,
}

impl PhotoCatalog {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Exact-match dedup lookup.
    ///
    /// Returns the record owning `fingerprint`, if any. Legacy rows with a
    /// NULL fingerprint can never match.
    pub async fn find_by_fingerprint(&self, fingerprint: &str) -> CatalogResult<Option<Photo>> {
        let photo = sqlx::query_as::<_, Photo>(&format!(
            "SELECT {PHOTO_COLUMNS} FROM photos WHERE fingerprint = ?"
        ))
        .bind(fingerprint)
        .fetch_optional(&*self.db)
        .await?;
        Ok(photo)
    }

    /// Insert a new photo record.
    ///
    /// Non-null fingerprints are unique across the catalog; on a conflict the
    /// first writer wins and the new insert fails as a duplicate.
    pub async fn insert(&self, new: NewPhoto) -> CatalogResult<Photo> {
        let now = Utc::now();
        let result = sqlx::query_as::<_, Photo>(&format!(
            "INSERT INTO photos (
                id, title, description, tags, category_id, url, thumbnail_url,
                public_id, width, height, downloads, fingerprint, created_at, updated_at
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?)
             RETURNING {PHOTO_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&new.title)
        .bind(&new.description)
        .bind(encode_tags(&new.tags))
        .bind(new.category_id)
        .bind(&new.url)
        .bind(&new.thumbnail_url)
        .bind(&new.public_id)
        .bind(new.width)
        .bind(new.height)
        .bind(&new.fingerprint)
        .bind(now)
        .bind(now)
        .fetch_one(&*self.db)
        .await;

        match result {
            Ok(photo) => Ok(photo),
            Err(err) if is_unique_violation(&err) => Err(CatalogError::DuplicateFingerprint(
                new.fingerprint.unwrap_or_default(),
            )),
            Err(err) => Err(CatalogError::Sqlx(err)),
        }
    }

    /// List photos, newest first, optionally narrowed by category and a
    /// case-insensitive search over title and tags.
    pub async fn list(&self, filter: PhotoFilter) -> CatalogResult<Vec<Photo>> {
        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {PHOTO_COLUMNS} FROM photos WHERE 1 = 1"
        ));

        if let Some(category) = filter.category {
            builder.push(" AND category_id = ");
            builder.push_bind(category);
        }

        if let Some(search) = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            let pattern = format!("%{}%", search.to_lowercase());
            builder.push(" AND (lower(title) LIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR lower(tags) LIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }

        builder.push(" ORDER BY created_at DESC");

        let photos = builder.build_query_as().fetch_all(&*self.db).await?;
        Ok(photos)
    }

    /// Fetch a single photo by id.
    pub async fn get(&self, id: Uuid) -> CatalogResult<Photo> {
        sqlx::query_as::<_, Photo>(&format!(
            "SELECT {PHOTO_COLUMNS} FROM photos WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&*self.db)
        .await?
        .ok_or(CatalogError::PhotoNotFound(id))
    }

    /// Apply a partial update; unset fields keep their stored values.
    pub async fn update(&self, id: Uuid, changes: PhotoChanges) -> CatalogResult<Photo> {
        let tags = changes.tags.as_deref().map(encode_tags);
        sqlx::query_as::<_, Photo>(&format!(
            "UPDATE photos SET
                title = COALESCE(?, title),
                description = COALESCE(?, description),
                tags = COALESCE(?, tags),
                category_id = COALESCE(?, category_id),
                updated_at = ?
             WHERE id = ?
             RETURNING {PHOTO_COLUMNS}"
        ))
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(tags)
        .bind(changes.category_id)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&*self.db)
        .await?
        .ok_or(CatalogError::PhotoNotFound(id))
    }

    /// Delete a photo record. The remote asset is left in place; pruning the
    /// media host is an operator task, not a catalog concern.
    pub async fn delete(&self, id: Uuid) -> CatalogResult<()> {
        let result = sqlx::query("DELETE FROM photos WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::PhotoNotFound(id));
        }
        Ok(())
    }
}

/// Encode tags as the JSON text stored in the `tags` column.
fn encode_tags(tags: &[String]) -> String {
    serde_json::to_string(tags).unwrap_or_else(|_| "[]".into())
}

/// Return true if SQLx error indicates a unique constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.message().to_ascii_lowercase().contains("unique")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_catalog() -> PhotoCatalog {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let sql = include_str!("../../migrations/0001_init.sql");
        for stmt in sql.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            sqlx::query(stmt).execute(&pool).await.unwrap();
        }
        PhotoCatalog::new(Arc::new(pool))
    }

    fn sample(title: &str, fingerprint: Option<&str>) -> NewPhoto {
        NewPhoto {
            title: title.to_string(),
            description: String::new(),
            tags: vec!["landscape".into(), "golden hour".into()],
            category_id: None,
            url: format!("https://res.example.com/{title}.jpg"),
            thumbnail_url: format!("https://res.example.com/thumb/{title}.jpg"),
            public_id: format!("photos/{title}"),
            width: 3000,
            height: 2000,
            fingerprint: fingerprint.map(String::from),
        }
    }

    #[tokio::test]
    async fn insert_and_find_by_fingerprint() {
        let catalog = test_catalog().await;
        let created = catalog.insert(sample("dunes", Some("abc123"))).await.unwrap();

        let found = catalog.find_by_fingerprint("abc123").await.unwrap();
        assert_eq!(found.map(|p| p.id), Some(created.id));
        assert!(catalog.find_by_fingerprint("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_fingerprint_is_first_writer_wins() {
        let catalog = test_catalog().await;
        catalog.insert(sample("first", Some("dead"))).await.unwrap();

        let err = catalog.insert(sample("second", Some("dead"))).await.unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateFingerprint(fp) if fp == "dead"));

        let kept = catalog.find_by_fingerprint("dead").await.unwrap().unwrap();
        assert_eq!(kept.title, "first");
    }

    #[tokio::test]
    async fn legacy_rows_without_fingerprint_are_unconstrained() {
        let catalog = test_catalog().await;
        catalog.insert(sample("old-a", None)).await.unwrap();
        catalog.insert(sample("old-b", None)).await.unwrap();

        let all = catalog.list(PhotoFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn list_filters_by_search_over_title_and_tags() {
        let catalog = test_catalog().await;
        catalog.insert(sample("alpine-lake", Some("f1"))).await.unwrap();
        let mut city = sample("city-night", Some("f2"));
        city.tags = vec!["urban".into()];
        catalog.insert(city).await.unwrap();

        let by_title = catalog
            .list(PhotoFilter {
                search: Some("Alpine".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].title, "alpine-lake");

        let by_tag = catalog
            .list(PhotoFilter {
                search: Some("urban".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_tag.len(), 1);
        assert_eq!(by_tag[0].title, "city-night");
    }

    #[tokio::test]
    async fn list_filters_by_category() {
        let catalog = test_catalog().await;
        let category = Uuid::new_v4();
        let mut tagged = sample("in-category", Some("f3"));
        tagged.category_id = Some(category);
        catalog.insert(tagged).await.unwrap();
        catalog.insert(sample("uncategorized", Some("f4"))).await.unwrap();

        let filtered = catalog
            .list(PhotoFilter {
                category: Some(category),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title, "in-category");
    }

    #[tokio::test]
    async fn update_keeps_unset_fields() {
        let catalog = test_catalog().await;
        let created = catalog.insert(sample("before", Some("f5"))).await.unwrap();

        let updated = catalog
            .update(
                created.id,
                PhotoChanges {
                    title: Some("after".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "after");
        assert_eq!(updated.tag_list(), created.tag_list());
        assert_eq!(updated.url, created.url);
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let catalog = test_catalog().await;
        let created = catalog.insert(sample("gone", Some("f6"))).await.unwrap();

        catalog.delete(created.id).await.unwrap();
        let err = catalog.get(created.id).await.unwrap_err();
        assert!(matches!(err, CatalogError::PhotoNotFound(id) if id == created.id));
    }
}
