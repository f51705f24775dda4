use gallery_storage::StorageError;
use thiserror::Error;

use super::UploadState;
use crate::thumbnail::ThumbnailError;

/// Errors that halt processing of one upload event
///
/// Each variant names the step that failed. Nothing is retried here: the event is expected to be
/// redelivered by the notification mechanism.
#[derive(Error, Debug)]
pub enum ProcessError {
    /// The collision check could not read the store
    #[error("error checking existence of {path}: {source}")]
    ExistenceCheckFailed {
        /// Path being checked
        path: String,
        /// Store failure
        source: StorageError,
    },

    /// Reading the upload or writing the thumbnail failed
    #[error("object store unavailable while {action} {path}: {source}")]
    StoreUnavailable {
        /// What was being attempted
        action: &'static str,
        /// Object involved
        path: String,
        /// Store failure
        source: StorageError,
    },

    /// The upload is larger than the processor buffers
    #[error("upload {path} is too large to thumbnail: {source}")]
    UploadTooLarge {
        /// Upload being thumbnailed
        path: String,
        /// Size refusal from the store
        source: StorageError,
    },

    /// The generator rejected the image
    #[error("error generating thumbnail for {path}: {source}")]
    ThumbnailGenerationFailed {
        /// Upload being thumbnailed
        path: String,
        /// Generator failure
        source: ThumbnailError,
    },

    /// Copying the upload to its final location failed
    #[error("error copying {from} to {to}: {source}")]
    MoveFailed {
        /// Upload path
        from: String,
        /// Destination of the original
        to: String,
        /// Store failure
        source: StorageError,
    },

    /// Granting public read access failed
    #[error("error making {path} public: {source}")]
    PublishFailed {
        /// Object whose ACL update failed
        path: String,
        /// The upload could not be deleted after the copy
        upload_retained: bool,
        /// Store failure
        source: StorageError,
    },
}

impl ProcessError {
    /// Last state the upload completed before the failure
    #[must_use]
    pub const fn reached_state(&self) -> UploadState {
        match self {
            Self::ExistenceCheckFailed { .. } => UploadState::Received,
            Self::StoreUnavailable { .. }
            | Self::UploadTooLarge { .. }
            | Self::ThumbnailGenerationFailed { .. } => UploadState::PathsResolved,
            Self::MoveFailed { .. } => UploadState::Thumbnailed,
            Self::PublishFailed {
                upload_retained: true,
                ..
            } => UploadState::Copied,
            Self::PublishFailed {
                upload_retained: false,
                ..
            } => UploadState::Moved,
        }
    }
}
