//! Service layer: the upload pipeline and its collaborators.

pub mod image_normalizer;
pub mod media_host;
pub mod photo_catalog;
pub mod upload_service;
