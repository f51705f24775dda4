// Not every helper is used in every test, so we allow dead code
#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response, Router};
use bytes::Bytes;
use gallery_storage::memory::MemoryObjectStore;
use tower::ServiceExt;
use upload_processor::{
    processor::UploadProcessor,
    server,
    thumbnail::{ThumbnailError, ThumbnailGenerator, ThumbnailResult},
};

pub const TEST_BUCKET: &str = "test-gallery-bucket";

/// Initialize tracing for tests
pub fn setup_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

/// Prefixes the source with `thumb:` so tests can tell thumbnails from originals
pub struct PrefixThumbnailer;

#[async_trait]
impl ThumbnailGenerator for PrefixThumbnailer {
    async fn generate(&self, source: Bytes) -> ThumbnailResult<Bytes> {
        let mut thumbnail = b"thumb:".to_vec();
        thumbnail.extend_from_slice(&source);
        Ok(Bytes::from(thumbnail))
    }
}

/// Rejects every image
pub struct RejectingThumbnailer;

#[async_trait]
impl ThumbnailGenerator for RejectingThumbnailer {
    async fn generate(&self, _source: Bytes) -> ThumbnailResult<Bytes> {
        Err(ThumbnailError::Exit {
            status: "exit status: 1".to_string(),
            stderr: "convert: no decode delegate for this image format".to_string(),
        })
    }
}

/// Processor, router and in-memory store wired together
pub struct TestSetup {
    pub store: Arc<MemoryObjectStore>,
    pub processor: Arc<UploadProcessor>,
    pub router: Router,
}

impl TestSetup {
    pub fn new() -> Self {
        Self::with_thumbnailer(Arc::new(PrefixThumbnailer))
    }

    pub fn with_thumbnailer(thumbnailer: Arc<dyn ThumbnailGenerator>) -> Self {
        setup_test_env();

        let store = Arc::new(MemoryObjectStore::new(TEST_BUCKET));
        let processor = Arc::new(UploadProcessor::new(store.clone(), thumbnailer));
        let router = server::app(processor.clone());

        Self {
            store,
            processor,
            router,
        }
    }

    pub async fn send_post_request(
        &self,
        route: &str,
        payload: serde_json::Value,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("POST")
            .header("Content-Type", "application/json")
            .body(Body::from(payload.to_string()))?;

        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn send_get_request(
        &self,
        route: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("GET")
            .body(Body::empty())?;

        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }
}

pub async fn parse_response_body(response: Response) -> serde_json::Value {
    use http_body_util::BodyExt;

    let body = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    serde_json::from_slice(&body).expect("Body is not JSON")
}
