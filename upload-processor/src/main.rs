use std::sync::Arc;

use gallery_storage::{ObjectStore, S3ObjectStore};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use upload_processor::{processor::UploadProcessor, server, thumbnail, types::Environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env();

    // JSON logs for staging/production, regular format for development
    if environment.json_logs() {
        fmt()
            .json()
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    } else {
        fmt().with_env_filter(EnvFilter::from_default_env()).init();
    }

    info!("Starting Upload Processor in {:?} environment", environment);

    // The store client is the only dependency whose failure aborts startup
    let store = Arc::new(S3ObjectStore::connect(environment.store_config()).await?);
    info!("✅ Initialized object store for bucket {}", store.bucket());

    let backend = environment.thumbnail_backend();
    let thumbnailer = thumbnail::generator(backend, environment.thumbnail_height());
    info!("✅ Initialized {backend} thumbnail generator");

    let processor = Arc::new(
        UploadProcessor::new(store, thumbnailer)
            .with_max_upload_bytes(environment.max_upload_bytes()),
    );

    server::start(environment, processor).await?;

    info!("✅ Upload Processor shutdown complete");

    Ok(())
}
