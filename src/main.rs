use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use task_keeper::{
    build_router,
    config::{Config, StorageBackend},
    services::{LogNotifier, MemoryStore, Notifier, RedisNotifier, RedisService},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    let state = match config.storage.backend {
        StorageBackend::Redis => {
            let client = Arc::new(
                redis::Client::open(config.redis.url.as_str())
                    .context("Invalid Redis URL")?,
            );
            let store = Arc::new(RedisService::new(client.clone()));
            let notifier: Arc<dyn Notifier> = if config.notification.enabled {
                Arc::new(RedisNotifier::new(client, config.notification.channel.clone()))
            } else {
                Arc::new(LogNotifier)
            };
            AppState::new(&config.auth, store.clone(), store, notifier)
        }
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage; data is lost on shutdown");
            let store = Arc::new(MemoryStore::new());
            AppState::new(&config.auth, store.clone(), store, Arc::new(LogNotifier))
        }
    }
    .context("Failed to initialise credential codec")?;

    let app = build_router(state, config.server.max_body_bytes);

    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!(%address, "task service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down after in-flight requests finish");
}
