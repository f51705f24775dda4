//! Object storage for the image gallery
//!
//! This crate provides the object store abstraction shared between the gallery backend and the
//! upload processor, the S3-compatible client used in deployments, and the projection of stored
//! objects into logical gallery images.

mod error;
pub mod image;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod s3;
mod store;

pub use error::{StorageError, StorageResult};
pub use image::{project_images, Image, DEFAULT_PUBLIC_URL_BASE};
pub use s3::{S3ObjectStore, StoreConfig};
pub use store::{ObjectStore, StoredObject, DEFAULT_BUCKET, PROCESSED_PREFIX, UPLOADS_PREFIX};
