//! Thumbnail generation
//!
//! A generator turns the bytes of an uploaded image into the bytes of a smaller image. The
//! default implementation pipes the image through ImageMagick; the native one decodes and
//! resizes in-process with the `image` crate.

mod command;
mod error;
mod native;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use strum::{Display, EnumString};

pub use command::CommandThumbnailer;
pub use error::{ThumbnailError, ThumbnailResult};
pub use native::NativeThumbnailer;

/// Height thumbnails are scaled to, in pixels
pub const DEFAULT_THUMBNAIL_HEIGHT: u32 = 100;

/// Turns image bytes into thumbnail bytes
#[async_trait]
pub trait ThumbnailGenerator: Send + Sync {
    /// Generates a thumbnail for `source`
    ///
    /// # Errors
    ///
    /// Returns `ThumbnailError` if the image cannot be transformed
    async fn generate(&self, source: Bytes) -> ThumbnailResult<Bytes>;
}

/// Available generator implementations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ThumbnailBackend {
    /// External `convert` process
    ImageMagick,
    /// In-process resize
    Native,
}

/// Builds the generator for `backend`, scaling to `height` pixels
#[must_use]
pub fn generator(backend: ThumbnailBackend, height: u32) -> Arc<dyn ThumbnailGenerator> {
    match backend {
        ThumbnailBackend::ImageMagick => Arc::new(CommandThumbnailer::imagemagick(height)),
        ThumbnailBackend::Native => Arc::new(NativeThumbnailer::new(height)),
    }
}
