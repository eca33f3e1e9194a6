mod api_doc;
mod config;
mod error;
mod handlers;
mod models;
mod repository;
mod routes;
mod spanner;
mod state;

use std::sync::Arc;

use anyhow::Context;
use config::{Config, StoreBackend};
use repository::{InMemoryItemRepository, ItemRepository};
use spanner::SpannerItemRepository;
use state::AppState;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real environment variables still apply
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("rust-spanner-items starting");

    let config = Config::from_env()?;
    config.log_startup();

    let repository: Arc<dyn ItemRepository> = match config.store_backend {
        StoreBackend::Spanner => Arc::new(SpannerItemRepository::from_config(&config).await?),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory item store; data is lost on shutdown");
            Arc::new(InMemoryItemRepository::new())
        }
    };

    let app = routes::router(AppState::new(repository), config.api_base_path.as_deref());

    let listener = bind_listener(&config.service_host, config.service_port).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("rust-spanner-items stopped");
    Ok(())
}

/// Bind the service socket; `host` may be an IP literal (v4 or v6) or a hostname
async fn bind_listener(host: &str, port: u16) -> anyhow::Result<TcpListener> {
    TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind SERVICE_HOST={} SERVICE_PORT={}", host, port))
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
