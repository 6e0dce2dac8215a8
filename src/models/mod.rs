//! Core data models for the portfolio backend.
//!
//! These entities represent the photo catalog and the transient shapes that
//! flow through the upload pipeline. Persisted types map cleanly to database
//! tables via `sqlx::FromRow` and serialize naturally as JSON via `serde`.

pub mod photo;
pub mod upload;
