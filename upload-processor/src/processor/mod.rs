//! Upload processing pipeline
//!
//! Every event walks `Received → PathsResolved → Thumbnailed → Copied → Moved → Published →
//! Done`. The first failing step stops the run and is reported as a [`ProcessError`]; the upload
//! object is never touched before the original has been copied, so a redelivered event can start
//! over.

mod error;

use std::path::Path;
use std::sync::Arc;

use gallery_storage::{ObjectStore, StorageError, UPLOADS_PREFIX};
use mime::Mime;
use strum::Display;
use tracing::{debug, error, info, instrument, warn};

pub use error::ProcessError;

use crate::event::UploadEvent;
use crate::paths::{has_file_name, resolve_collision_free_paths, PathPair};
use crate::thumbnail::ThumbnailGenerator;

/// Progress of one upload through the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum UploadState {
    /// Event accepted
    Received,
    /// Collision-free destinations chosen
    PathsResolved,
    /// Thumbnail written
    Thumbnailed,
    /// Original copied, upload not yet deleted
    Copied,
    /// Upload removed after the copy
    Moved,
    /// Both objects publicly readable
    Published,
    /// Terminal success
    Done,
}

/// Why an event was not acted upon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SkipReason {
    /// Object is not under `uploads/`
    OutsideUploads,
    /// Event names a bucket this processor does not serve
    ForeignBucket,
    /// Object has no file name to publish under, e.g. a folder placeholder
    Unnamed,
}

/// Largest upload read into memory for thumbnailing, in bytes
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 32 * 1024 * 1024;

/// Result of a successful pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedUpload {
    /// Where the pair was published
    pub paths: PathPair,
    /// Deleting the upload failed after the copy, so it still exists next to the original
    pub upload_retained: bool,
}

/// What happened to an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Not applicable, nothing was read or written
    Skipped(SkipReason),
    /// Thumbnail and original published
    Completed(ProcessedUpload),
}

/// Runs the thumbnail pipeline for upload events
pub struct UploadProcessor {
    store: Arc<dyn ObjectStore>,
    thumbnailer: Arc<dyn ThumbnailGenerator>,
    max_upload_bytes: u64,
}

impl UploadProcessor {
    /// Creates a processor writing to `store`
    #[must_use]
    pub fn new(store: Arc<dyn ObjectStore>, thumbnailer: Arc<dyn ThumbnailGenerator>) -> Self {
        Self {
            store,
            thumbnailer,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Refuses uploads larger than `max_upload_bytes`
    ///
    /// Uploads and thumbnails are held in memory while the generator runs, so this bounds the
    /// memory one event can take.
    #[must_use]
    pub const fn with_max_upload_bytes(mut self, max_upload_bytes: u64) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    /// Processes one upload event
    ///
    /// # Errors
    ///
    /// Returns the `ProcessError` of the first failing step
    #[instrument(skip(self, event), fields(object = %event.name))]
    pub async fn process(&self, event: &UploadEvent) -> Result<ProcessOutcome, ProcessError> {
        info!("Processing file: {}", event.name);

        if !event.name.starts_with(UPLOADS_PREFIX) {
            debug!("Ignoring {}: not an upload", event.name);
            return Ok(ProcessOutcome::Skipped(SkipReason::OutsideUploads));
        }

        if !has_file_name(&event.name) {
            debug!("Ignoring {}: no file name", event.name);
            return Ok(ProcessOutcome::Skipped(SkipReason::Unnamed));
        }

        if event.bucket != self.store.bucket() {
            warn!(
                "Ignoring {}: bucket {} is not served here",
                event.name, event.bucket
            );
            return Ok(ProcessOutcome::Skipped(SkipReason::ForeignBucket));
        }

        let result = self.run(&event.name).await;

        match &result {
            Ok(upload) => info!(
                thumbnail = %upload.paths.thumbnail_path,
                original = %upload.paths.original_path,
                "Published {}",
                event.name
            ),
            Err(err) => error!(
                state = %err.reached_state(),
                "error: {err}"
            ),
        }

        result.map(ProcessOutcome::Completed)
    }

    async fn run(&self, upload: &str) -> Result<ProcessedUpload, ProcessError> {
        advance(UploadState::Received, upload);

        let paths = resolve_collision_free_paths(self.store.as_ref(), upload).await?;
        advance(UploadState::PathsResolved, upload);

        self.thumbnail(upload, &paths.thumbnail_path).await?;
        advance(UploadState::Thumbnailed, upload);

        let upload_retained = self.relocate(upload, &paths.original_path).await?;

        self.publish(&paths, upload_retained).await?;
        advance(UploadState::Published, upload);

        advance(UploadState::Done, upload);

        Ok(ProcessedUpload {
            paths,
            upload_retained,
        })
    }

    /// Writes the thumbnail of `upload` to `destination`
    ///
    /// The thumbnail is generated completely before anything is written, so a failing generator
    /// never leaves a partial object behind.
    async fn thumbnail(&self, upload: &str, destination: &str) -> Result<(), ProcessError> {
        let source = self
            .store
            .get(upload, self.max_upload_bytes)
            .await
            .map_err(|source| match source {
                StorageError::TooLarge { .. } => ProcessError::UploadTooLarge {
                    path: upload.to_string(),
                    source,
                },
                source => ProcessError::StoreUnavailable {
                    action: "reading",
                    path: upload.to_string(),
                    source,
                },
            })?;

        let thumbnail = self.thumbnailer.generate(source).await.map_err(|source| {
            ProcessError::ThumbnailGenerationFailed {
                path: upload.to_string(),
                source,
            }
        })?;

        let content_type = content_type_for(destination);

        self.store
            .put(
                destination,
                thumbnail,
                content_type.as_ref().map(Mime::essence_str),
            )
            .await
            .map_err(|source| ProcessError::StoreUnavailable {
                action: "writing",
                path: destination.to_string(),
                source,
            })
    }

    /// Copies `upload` to `destination`, then deletes it
    ///
    /// Returns whether the upload is still present. A failed delete after a successful copy
    /// leaves a duplicate behind; that is reported, not treated as a failure.
    async fn relocate(&self, upload: &str, destination: &str) -> Result<bool, ProcessError> {
        self.store
            .copy(upload, destination)
            .await
            .map_err(|source| ProcessError::MoveFailed {
                from: upload.to_string(),
                to: destination.to_string(),
                source,
            })?;
        advance(UploadState::Copied, upload);

        if let Err(err) = self.store.delete(upload).await {
            warn!("error deleting {upload}, it remains next to {destination}: {err}");
            return Ok(true);
        }
        advance(UploadState::Moved, upload);

        Ok(false)
    }

    async fn publish(&self, paths: &PathPair, upload_retained: bool) -> Result<(), ProcessError> {
        for path in [&paths.original_path, &paths.thumbnail_path] {
            self.store
                .make_public(path)
                .await
                .map_err(|source| ProcessError::PublishFailed {
                    path: path.clone(),
                    upload_retained,
                    source,
                })?;
        }

        Ok(())
    }
}

fn advance(state: UploadState, upload: &str) {
    debug!(%state, "{upload} reached {state}");
}

/// Content type registered for the extension, `None` when there is none
fn content_type_for(path: &str) -> Option<Mime> {
    mime_guess::from_path(path).first()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for() {
        assert_eq!(
            content_type_for("processed/cat/thumbnail.PNG"),
            Some(mime::IMAGE_PNG)
        );
        assert_eq!(
            content_type_for("processed/cat/thumbnail.jpeg"),
            Some(mime::IMAGE_JPEG)
        );
        assert_eq!(
            content_type_for("processed/cat/thumbnail.tif")
                .as_ref()
                .map(Mime::essence_str),
            Some("image/tiff")
        );
        assert_eq!(
            content_type_for("processed/cat/thumbnail.ico")
                .as_ref()
                .map(Mime::essence_str),
            Some("image/x-icon")
        );
        assert_eq!(
            content_type_for("processed/cat/thumbnail.jpe"),
            Some(mime::IMAGE_JPEG)
        );
        assert_eq!(content_type_for("processed/cat/thumbnail.notanext"), None);
        assert_eq!(content_type_for("processed/README/thumbnail"), None);
    }

    #[test]
    fn test_reached_state_names() {
        assert_eq!(UploadState::PathsResolved.to_string(), "paths_resolved");
        assert_eq!(SkipReason::OutsideUploads.to_string(), "outside_uploads");
        assert_eq!(SkipReason::Unnamed.to_string(), "unnamed");
        assert_eq!(UploadState::Copied.to_string(), "copied");
    }
}
