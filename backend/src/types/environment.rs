//! Environment configuration for different deployment stages

use std::env;
use std::num::ParseIntError;

use gallery_storage::{StoreConfig, DEFAULT_BUCKET, DEFAULT_PUBLIC_URL_BASE};

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

    /// Bucket holding the processed images
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

    /// Prefix of the public links handed out for images
    #[must_use]
    pub fn public_url_base(&self) -> String {
        env::var("PUBLIC_URL_BASE").unwrap_or_else(|_| DEFAULT_PUBLIC_URL_BASE.to_string())
    }

    /// Port the API listens on
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` is set but is not a valid port number
    pub fn port(&self) -> Result<u16, ParseIntError> {
        env::var("PORT").map_or(Ok(DEFAULT_PORT), |p| p.parse())
    }

    /// Whether to show API docs
    #[must_use]
    pub const fn show_api_docs(&self) -> bool {
        matches!(self, Self::Development | Self::Staging)
    }

    /// Whether logs are emitted as JSON
    #[must_use]
    pub const fn json_logs(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}
