//! Shared application state carried by the router.

use crate::middleware::auth::JwtVerifier;
use crate::services::media_host::MediaHost;
use crate::services::photo_catalog::PhotoCatalog;
use crate::services::upload_service::UploadService;
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Shared SQLite pool, used directly only by the readiness probe.
    pub db: Arc<SqlitePool>,

    /// Photo catalog (dedup reads, CRUD writes).
    pub catalog: PhotoCatalog,

    /// The upload pipeline.
    pub uploads: Arc<UploadService>,

    /// Remote media host handle, shared with the pipeline.
    pub media_host: Arc<dyn MediaHost>,

    /// Token verifier for admin routes.
    pub jwt: JwtVerifier,
}
