use std::sync::Arc;

use gallery_backend::{gallery::GalleryService, server, types::Environment};
use gallery_storage::{ObjectStore, S3ObjectStore};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env();

    // Configure logging format based on environment
    // Use JSON format for staging/production (Datadog), regular format for development
    if environment.json_logs() {
        fmt()
            .json()
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    } else {
        fmt().with_env_filter(EnvFilter::from_default_env()).init();
    }

    info!("Starting Image Gallery in {:?} environment", environment);

    let store = Arc::new(S3ObjectStore::connect(environment.store_config()).await?);
    info!("✅ Initialized object store for bucket {}", store.bucket());

    let gallery = Arc::new(GalleryService::new(store, environment.public_url_base()));

    server::start(environment, gallery).await?;

    info!("✅ Image Gallery shutdown complete");

    Ok(())
}
