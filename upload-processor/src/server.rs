use std::sync::Arc;

use aide::openapi::OpenApi;
use axum::{Extension, Router};
use datadog_tracing::axum::{shutdown_signal, OtelAxumLayer, OtelInResponseLayer};
use tokio::net::TcpListener;

use crate::processor::UploadProcessor;
use crate::routes;
use crate::types::Environment;

/// Builds the application router
#[must_use]
pub fn app(processor: Arc<UploadProcessor>) -> Router {
    let mut openapi = OpenApi::default();

    routes::handler()
        .finish_api(&mut openapi)
        .layer(Extension(processor))
        // Include trace context as header into the response
        .layer(OtelInResponseLayer)
        // Start OpenTelemetry trace on incoming request
        .layer(OtelAxumLayer::default())
}

/// Starts the server with the given environment and dependencies
///
/// Thumbnailing can take long, so no request timeout is applied here; the hosting platform
/// enforces its own.
///
/// # Errors
///
/// Returns an error if the server fails to start or bind to the port
pub async fn start(environment: Environment, processor: Arc<UploadProcessor>) -> anyhow::Result<()> {
    let router = app(processor);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], environment.port()?));

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🔄 Upload Processor started on http://{addr}");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)
}
