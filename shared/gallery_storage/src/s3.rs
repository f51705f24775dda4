//! S3-compatible object store client
//!
//! Speaks the S3 API, which Cloud Storage also serves through its XML interoperability endpoint
//! (`https://storage.googleapis.com`) and which `LocalStack` serves in development.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion, Region};
use aws_sdk_s3::{
    config::http::HttpResponse,
    error::{DisplayErrorContext, SdkError},
    operation::head_object::HeadObjectError,
    primitives::ByteStream,
    types::ObjectCannedAcl,
    Client as S3Client,
};
use bytes::Bytes;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::{debug, info};
use url::Url;

use crate::{ObjectStore, StorageError, StorageResult, StoredObject};

const MAX_ATTEMPTS: u32 = 3;

/// Characters left unescaped in object keys
const KEY_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Connection settings for the object store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Bucket every operation targets
    pub bucket: String,
    /// Endpoint override; `None` uses the regular AWS endpoints
    pub endpoint_url: Option<String>,
    /// Signing region (`auto` for Cloud Storage)
    pub region: String,
    /// Use `<endpoint>/<bucket>/<key>` addressing instead of virtual hosts
    pub force_path_style: bool,
}

impl StoreConfig {
    /// Cloud Storage through its S3-interoperable XML API
    #[must_use]
    pub fn cloud_storage(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            endpoint_url: Some("https://storage.googleapis.com".to_string()),
            region: "auto".to_string(),
            force_path_style: true,
        }
    }

    /// `LocalStack` on its default port
    #[must_use]
    pub fn localstack(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            endpoint_url: Some("http://localhost:4566".to_string()),
            region: "us-east-1".to_string(),
            force_path_style: true,
        }
    }

    /// AWS configuration with retry and timeout settings
    pub async fn aws_config(&self) -> aws_config::SdkConfig {
        let retry_config = RetryConfig::standard()
            .with_max_attempts(MAX_ATTEMPTS)
            .with_initial_backoff(Duration::from_millis(50));

        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(30))
            .build();

        let mut config_builder = aws_config::load_defaults(BehaviorVersion::latest())
            .await
            .to_builder()
            .region(Region::new(self.region.clone()))
            .retry_config(retry_config)
            .timeout_config(timeout_config);

        if let Some(endpoint_url) = &self.endpoint_url {
            config_builder = config_builder.endpoint_url(endpoint_url);
        }

        config_builder.build()
    }

    /// S3 service configuration
    pub async fn s3_client_config(&self) -> aws_sdk_s3::Config {
        let aws_config = self.aws_config().await;
        let s3_config: aws_sdk_s3::Config = (&aws_config).into();
        let mut builder = s3_config.to_builder();

        if self.force_path_style {
            builder.set_force_path_style(Some(true));
        }

        builder.build()
    }

    fn media_base(&self) -> &str {
        self.endpoint_url
            .as_deref()
            .unwrap_or("https://s3.amazonaws.com")
    }
}

/// Object store backed by an S3-compatible service
pub struct S3ObjectStore {
    s3_client: Arc<S3Client>,
    config: StoreConfig,
}

impl S3ObjectStore {
    /// Creates a store from a pre-configured client
    #[must_use]
    pub const fn new(s3_client: Arc<S3Client>, config: StoreConfig) -> Self {
        Self { s3_client, config }
    }

    /// Builds the client and verifies the bucket is reachable
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the bucket check fails
    pub async fn connect(config: StoreConfig) -> StorageResult<Self> {
        let s3_client = Arc::new(S3Client::from_conf(config.s3_client_config().await));
        let store = Self::new(s3_client, config);

        store
            .s3_client
            .head_bucket()
            .bucket(&store.config.bucket)
            .send()
            .await
            .map_err(|err| classify("head bucket", &store.config.bucket, err))?;

        info!(
            bucket = %store.config.bucket,
            endpoint = store.config.media_base(),
            "Initialized object store client with {MAX_ATTEMPTS} max attempts"
        );

        Ok(store)
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn bucket(&self) -> &str {
        &self.config.bucket
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let result = self
            .s3_client
            .head_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(SdkError::ServiceError(service_err))
                if matches!(service_err.err(), HeadObjectError::NotFound(_)) =>
            {
                debug!("Object does not exist: {key}");
                Ok(false)
            }
            Err(err) => match classify("head", key, err) {
                StorageError::NotFound(_) => Ok(false),
                other => Err(other),
            },
        }
    }

    async fn get(&self, key: &str, max_bytes: u64) -> StorageResult<Bytes> {
        let output = self
            .s3_client
            .get_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| classify("get", key, err))?;

        // Refuse before buffering when the store reports the size up front
        if let Some(size) = output
            .content_length()
            .and_then(|len| u64::try_from(len).ok())
        {
            check_size(key, size, max_bytes)?;
        }

        let body = output
            .body
            .collect()
            .await
            .map_err(|err| StorageError::AwsError(format!("reading body of {key}: {err}")))?
            .into_bytes();

        check_size(key, body.len() as u64, max_bytes)?;

        Ok(body)
    }

    async fn put(&self, key: &str, body: Bytes, content_type: Option<&str>) -> StorageResult<()> {
        debug!("Writing {} bytes to {key}", body.len());

        self.s3_client
            .put_object()
            .bucket(&self.config.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .set_content_type(content_type.map(ToString::to_string))
            .send()
            .await
            .map_err(|err| classify("put", key, err))?;

        Ok(())
    }

    async fn copy(&self, source: &str, destination: &str) -> StorageResult<()> {
        self.s3_client
            .copy_object()
            .bucket(&self.config.bucket)
            .copy_source(copy_source(&self.config.bucket, source))
            .key(destination)
            .send()
            .await
            .map_err(|err| classify("copy", source, err))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.s3_client
            .delete_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| classify("delete", key, err))?;

        Ok(())
    }

    async fn make_public(&self, key: &str) -> StorageResult<()> {
        self.s3_client
            .put_object_acl()
            .bucket(&self.config.bucket)
            .key(key)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|err| classify("set acl", key, err))?;

        Ok(())
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<StoredObject>> {
        let mut pages = self
            .s3_client
            .list_objects_v2()
            .bucket(&self.config.bucket)
            .prefix(prefix)
            .into_paginator()
            .send();

        let mut objects = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|err| classify("list", prefix, err))?;

            for object in page.contents() {
                let Some(key) = object.key() else {
                    continue;
                };

                objects.push(StoredObject {
                    name: key.to_string(),
                    bucket: self.config.bucket.clone(),
                    media_url: object_url(self.config.media_base(), &self.config.bucket, key)?,
                });
            }
        }

        debug!("Listed {} objects under {prefix}", objects.len());

        Ok(objects)
    }
}

/// Maps an SDK failure onto the store's error kinds
fn classify<E>(operation: &str, key: &str, err: SdkError<E, HttpResponse>) -> StorageError
where
    E: std::error::Error + Send + Sync + 'static,
{
    let status = match &err {
        SdkError::ServiceError(service_err) => Some(service_err.raw().status().as_u16()),
        _ => None,
    };
    let message = format!("{operation} {key}: {}", DisplayErrorContext(&err));

    match status {
        Some(404) => StorageError::NotFound(key.to_string()),
        Some(code) if code >= 500 => StorageError::UpstreamError(message),
        Some(_) => StorageError::S3Error(message),
        None => StorageError::AwsError(message),
    }
}

fn check_size(key: &str, size: u64, limit: u64) -> StorageResult<()> {
    if size > limit {
        return Err(StorageError::TooLarge {
            key: key.to_string(),
            size,
            limit,
        });
    }

    Ok(())
}

fn copy_source(bucket: &str, key: &str) -> String {
    format!("{bucket}/{}", utf8_percent_encode(key, KEY_SET))
}

fn object_url(base: &str, bucket: &str, key: &str) -> StorageResult<Url> {
    let link = format!(
        "{}/{bucket}/{}",
        base.trim_end_matches('/'),
        utf8_percent_encode(key, KEY_SET)
    );

    Url::parse(&link).map_err(|err| StorageError::InvalidMediaLink {
        link,
        reason: err.to_string(),
    })
}
