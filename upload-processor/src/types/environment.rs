//! Environment configuration for different deployment stages

use std::env;
use std::num::ParseIntError;

use gallery_storage::{StoreConfig, DEFAULT_BUCKET};

use crate::processor::DEFAULT_MAX_UPLOAD_BYTES;
use crate::thumbnail::{ThumbnailBackend, DEFAULT_THUMBNAIL_HEIGHT};

const DEFAULT_PORT: u16 = 8080;

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses `LocalStack`)
    Development,
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => Self::Development,
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Bucket holding uploads and processed images
    #[must_use]
    pub fn bucket_name(&self) -> String {
        env::var("BUCKET_NAME").unwrap_or_else(|_| DEFAULT_BUCKET.to_string())
    }

    /// Object store connection settings
    #[must_use]
    pub fn store_config(&self) -> StoreConfig {
        let mut config = match self {
            Self::Production | Self::Staging => StoreConfig::cloud_storage(self.bucket_name()),
            Self::Development => StoreConfig::localstack(self.bucket_name()),
        };

        if let Ok(endpoint_url) = env::var("STORE_ENDPOINT_URL") {
            config.endpoint_url = Some(endpoint_url);
        }

        config
    }

    /// Port the event endpoint listens on
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` is set but is not a valid port number
    pub fn port(&self) -> Result<u16, ParseIntError> {
        env::var("PORT").map_or(Ok(DEFAULT_PORT), |p| p.parse())
    }

    /// Which thumbnail generator to run
    ///
    /// # Panics
    ///
    /// Panics if `THUMBNAIL_BACKEND` names an unknown generator
    #[must_use]
    pub fn thumbnail_backend(&self) -> ThumbnailBackend {
        env::var("THUMBNAIL_BACKEND").map_or(ThumbnailBackend::ImageMagick, |backend| {
            backend
                .parse()
                .unwrap_or_else(|_| panic!("Invalid thumbnail backend: {backend}"))
        })
    }

    /// Thumbnail height in pixels
    #[must_use]
    pub fn thumbnail_height(&self) -> u32 {
        env::var("THUMBNAIL_HEIGHT")
            .ok()
            .and_then(|val| val.parse::<u32>().ok())
            .filter(|height| *height > 0)
            .unwrap_or(DEFAULT_THUMBNAIL_HEIGHT)
    }

    /// Largest upload the processor accepts, in bytes
    #[must_use]
    pub fn max_upload_bytes(&self) -> u64 {
        env::var("MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
    }

    /// Whether logs are emitted as JSON
    #[must_use]
    pub const fn json_logs(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}
