//! Defines routes for the portfolio backend.
//!
//! ## Structure
//! - **Upload pipeline**
//!   - `POST /api/upload/photo`           — upload a batch of ≤10 photos (admin)
//!   - `GET  /api/upload/test-cloudinary` — remote media host connectivity probe
//!
//! - **Photo catalog**
//!   - `GET    /api/photos`       — list (supports `category`, `search`)
//!   - `POST   /api/photos`       — create record for an uploaded asset (admin)
//!   - `GET    /api/photos/{id}`  — fetch one
//!   - `PUT    /api/photos/{id}`  — partial update (admin)
//!   - `DELETE /api/photos/{id}`  — delete (admin)
//!
//! Admin routes sit behind the bearer-token middleware; everything else is
//! public. The upload route carries a raised body limit for camera exports.

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        photo_handlers::{create_photo, delete_photo, get_photo, list_photos, update_photo},
        upload_handlers::{test_cloudinary, upload_photos, MAX_UPLOAD_BODY_BYTES},
    },
    middleware::auth::require_admin,
    state::AppState,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
};

/// Build and return the application router.
///
/// Takes the state up front (rather than leaving the router generic) because
/// the auth middleware needs it at construction time.
pub fn routes(state: AppState) -> Router {
    let admin = Router::new()
        .route(
            "/api/upload/photo",
            post(upload_photos).layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES)),
        )
        .route("/api/photos", post(create_photo))
        .route("/api/photos/{id}", put(update_photo).delete(delete_photo))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_admin,
        ));

    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // public catalog + probe routes
        .route("/api/upload/test-cloudinary", get(test_cloudinary))
        .route("/api/photos", get(list_photos))
        .route("/api/photos/{id}", get(get_photo))
        .merge(admin)
        .with_state(state)
}
