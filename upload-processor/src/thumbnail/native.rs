use std::io::Cursor;

use async_trait::async_trait;
use bytes::Bytes;
use image::imageops::FilterType;
use tracing::debug;

use super::{ThumbnailError, ThumbnailGenerator, ThumbnailResult};

/// In-process generator built on the `image` crate
///
/// Scales to a fixed height keeping the aspect ratio and re-encodes in the source format.
/// Decoding and resizing run on the blocking thread pool.
#[derive(Debug, Clone, Copy)]
pub struct NativeThumbnailer {
    height: u32,
}

impl NativeThumbnailer {
    /// Creates a generator producing thumbnails `height` pixels tall
    #[must_use]
    pub const fn new(height: u32) -> Self {
        Self { height }
    }
}

#[async_trait]
impl ThumbnailGenerator for NativeThumbnailer {
    async fn generate(&self, source: Bytes) -> ThumbnailResult<Bytes> {
        let height = self.height;

        tokio::task::spawn_blocking(move || render(&source, height))
            .await
            .map_err(|err| ThumbnailError::Task(err.to_string()))?
    }
}

fn render(source: &[u8], height: u32) -> ThumbnailResult<Bytes> {
    let format = image::guess_format(source).map_err(|err| ThumbnailError::Decode(err.to_string()))?;
    let img = image::load_from_memory_with_format(source, format)
        .map_err(|err| ThumbnailError::Decode(err.to_string()))?;

    let width = scaled_width(img.width(), img.height(), height);
    let thumbnail = img.resize_exact(width, height, FilterType::Triangle);

    let mut buf = Cursor::new(Vec::new());
    thumbnail
        .write_to(&mut buf, format)
        .map_err(|err| ThumbnailError::Encode(err.to_string()))?;

    debug!(
        original_width = img.width(),
        original_height = img.height(),
        width,
        height,
        "Thumbnail generated"
    );

    Ok(Bytes::from(buf.into_inner()))
}

/// Width that keeps the aspect ratio at `target_height`, rounded, never zero
fn scaled_width(width: u32, height: u32, target_height: u32) -> u32 {
    let height = u64::from(height.max(1));
    let scaled = (u64::from(width) * u64::from(target_height) + height / 2) / height;

    u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
}
