//! Error types for object store operations

use thiserror::Error;

/// Result type for object store operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during object store operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Object does not exist
    #[error("Object not found: {0}")]
    NotFound(String),

    /// Object store service error
    #[error("S3 service error: {0}")]
    S3Error(String),

    /// AWS SDK error (transport, dispatch, timeout)
    #[error("AWS SDK error: {0}")]
    AwsError(String),

    /// Upstream service error (5xx from the store)
    #[error("Upstream service error: {0}")]
    UpstreamError(String),

    /// Object body is larger than the caller accepts
    #[error("Object {key} is {size} bytes, over the {limit} byte limit")]
    TooLarge {
        /// Object that was refused
        key: String,
        /// Reported or observed body size
        size: u64,
        /// Largest accepted body
        limit: u64,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A listed object could not be turned into a media URL
    #[error("Invalid media link {link}: {reason}")]
    InvalidMediaLink {
        /// The link that failed to parse
        link: String,
        /// Parser message
        reason: String,
    },
}

impl StorageError {
    /// Whether the error is the store's not-found sentinel
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
