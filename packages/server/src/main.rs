use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use admissions_server::config::{AppConfig, StorageBackend, StorageConfig};
use admissions_server::state::AppState;
use admissions_server::{build_router, database, seed};
use anyhow::Context;
use common::storage::ObjectStore;
use common::storage::filesystem::FilesystemObjectStore;
use common::storage::memory::MemoryObjectStore;
use common::storage::s3::S3ObjectStore;
use tracing::{Level, info};

async fn build_store(config: &StorageConfig) -> anyhow::Result<Arc<dyn ObjectStore>> {
    let store: Arc<dyn ObjectStore> = match config.backend {
        StorageBackend::Filesystem => Arc::new(
            FilesystemObjectStore::new(config.root.clone(), config.public_base_url.clone())
                .await
                .with_context(|| format!("Failed to open storage root {}", config.root.display()))?,
        ),
        StorageBackend::S3 => {
            let s3 = config
                .s3
                .as_ref()
                .context("storage.backend = \"s3\" requires a [storage.s3] section")?;
            Arc::new(S3ObjectStore::new(s3)?)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory object storage; uploads are lost on restart");
            Arc::new(MemoryObjectStore::new(config.public_base_url.clone()))
        }
    };
    Ok(store)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;

    let level: Level = config.logging.level.parse().unwrap_or(Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    if config.auth.jwt_secret.len() < 32 {
        tracing::warn!("auth.jwt_secret is shorter than 32 bytes");
    }

    let db = database::init_db(&config.database.url)
        .await
        .context("Failed to connect to database")?;
    seed::ensure_indexes(&db).await?;
    if let Some(ref bootstrap) = config.auth.bootstrap_admin {
        seed::seed_bootstrap_admin(&db, bootstrap).await?;
    }

    let store = build_store(&config.storage).await?;
    info!(backend = store.backend_name(), "Object storage ready");

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server.host/server.port")?;

    let state = AppState::new(db, config, store);

    let limiter = state.rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            limiter.prune();
        }
    });

    let app = build_router(state);

    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}
