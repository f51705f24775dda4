// Not every helper is used in every test, so we allow dead code
#![allow(dead_code)]

use std::sync::Arc;

use axum::{body::Body, http::Request, response::Response, Router};
use gallery_backend::{gallery::GalleryService, server, types::Environment};
use gallery_storage::{memory::MemoryObjectStore, DEFAULT_PUBLIC_URL_BASE};
use tower::ServiceExt;

pub const TEST_BUCKET: &str = "test-gallery-bucket";

/// Initialize tracing for tests
pub fn setup_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

/// Gallery router backed by an in-memory store
pub struct TestSetup {
    pub router: Router,
    pub store: Arc<MemoryObjectStore>,
    pub gallery: Arc<GalleryService>,
}

impl TestSetup {
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryObjectStore::new(TEST_BUCKET)))
    }

    pub fn with_store(store: Arc<MemoryObjectStore>) -> Self {
        setup_test_env();

        let gallery = Arc::new(GalleryService::new(store.clone(), DEFAULT_PUBLIC_URL_BASE));
        let router = server::app(Environment::Development, gallery.clone());

        Self {
            router,
            store,
            gallery,
        }
    }

    /// Seeds a processed original and its thumbnail
    pub fn seed_image(&self, name: &str, extension: &str) {
        self.store.insert(
            format!("processed/{name}/original.{extension}"),
            format!("{name}-original"),
        );
        self.store.insert(
            format!("processed/{name}/thumbnail.{extension}"),
            format!("{name}-thumbnail"),
        );
    }

    pub async fn send_request(
        &self,
        method: &str,
        route: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method(method)
            .body(Body::empty())?;

        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn send_get_request(
        &self,
        route: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        self.send_request("GET", route).await
    }

    pub async fn send_delete_request(
        &self,
        route: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        self.send_request("DELETE", route).await
    }
}

pub async fn response_bytes(response: Response) -> bytes::Bytes {
    use http_body_util::BodyExt;

    response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes()
}

pub async fn parse_response_body(response: Response) -> serde_json::Value {
    let body = response_bytes(response).await;
    serde_json::from_slice(&body).expect("Body is not JSON")
}

/// Public link of an object in the test bucket
pub fn public_url(key: &str) -> String {
    format!("{DEFAULT_PUBLIC_URL_BASE}/{TEST_BUCKET}/{key}")
}
