use gallery_storage::StorageError;
use thiserror::Error;

/// Result type for gallery operations
pub type GalleryResult<T> = Result<T, GalleryError>;

/// Errors that can occur while serving gallery requests
#[derive(Error, Debug)]
pub enum GalleryError {
    /// Listing every processed image failed
    #[error("failed to list files: {source}")]
    ListFailed {
        /// Store failure
        source: StorageError,
    },

    /// Listing the objects of one image failed
    #[error("failed to read files {id}: {source}")]
    ReadFailed {
        /// Requested image id
        id: String,
        /// Store failure
        source: StorageError,
    },

    /// Listing the objects to delete failed
    #[error("error iterating over bucket query: {source}")]
    QueryFailed {
        /// Store failure
        source: StorageError,
    },

    /// Deleting one object of an image failed
    #[error("error deleting {key}: {source}")]
    DeleteFailed {
        /// Object that could not be deleted
        key: String,
        /// Store failure
        source: StorageError,
    },
}
