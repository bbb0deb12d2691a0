//! stub-backend: in-memory search backend server

use std::path::Path;
use std::sync::Arc;
use stub_backend::{router, sample_store, StubConfig};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = match std::env::args().nth(1) {
        Some(config_path) => StubConfig::from_file(Path::new(&config_path))?,
        None => StubConfig::default(),
    }
    .with_env_overrides();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting stub-backend v{}", env!("CARGO_PKG_VERSION"));

    let addr = config.socket_addr()?;
    let app = router(Arc::new(sample_store()));

    info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
