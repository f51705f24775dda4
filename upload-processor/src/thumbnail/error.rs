use thiserror::Error;

/// Result type for thumbnail generation
pub type ThumbnailResult<T> = Result<T, ThumbnailError>;

/// Errors that can occur while generating a thumbnail
#[derive(Error, Debug)]
pub enum ThumbnailError {
    /// The generator process could not be started
    #[error("failed to start {program}: {source}")]
    Spawn {
        /// Program that failed to start
        program: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Streaming bytes to or from the generator failed
    #[error("error streaming image through generator: {0}")]
    Io(#[from] std::io::Error),

    /// The generator exited unsuccessfully
    #[error("generator exited with {status}: {stderr}")]
    Exit {
        /// Exit status as reported by the OS
        status: String,
        /// Captured error output
        stderr: String,
    },

    /// The generator exited cleanly but wrote error output
    #[error("generator reported an error: {0}")]
    ErrorOutput(String),

    /// The source image could not be decoded
    #[error("failed to decode image: {0}")]
    Decode(String),

    /// The thumbnail could not be encoded
    #[error("failed to encode thumbnail: {0}")]
    Encode(String),

    /// The blocking resize task did not complete
    #[error("thumbnail task failed: {0}")]
    Task(String),
}
