//! diamond-depot server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use diamond_depot::api;
use diamond_depot::app_state::AppState;
use diamond_depot::config::{LogFormat, StorefrontConfig};
use diamond_depot::domain::EventBus;
use diamond_depot::persistence::mirror;
use diamond_depot::persistence::postgres::PostgresPersistence;
use diamond_depot::store::DocumentStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = StorefrontConfig::from_env().context("failed to load configuration")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(addr = %config.listen_addr, ?config, "starting diamond-depot");

    // Build storage
    let store = Arc::new(DocumentStore::new(config.store_tx_max_attempts));
    let event_bus = EventBus::new(config.event_bus_capacity);

    let mirror_handle = if config.persistence_enabled {
        let persistence = PostgresPersistence::connect(&config)
            .await
            .context("failed to connect to PostgreSQL")?;
        persistence
            .ensure_schema()
            .await
            .context("failed to apply migrations")?;
        let restored = mirror::restore(&persistence, &store)
            .await
            .context("failed to restore documents")?;
        tracing::info!(documents = restored, "store restored from PostgreSQL");
        Some(mirror::spawn_mirror(persistence, Arc::clone(&store), &event_bus))
    } else {
        tracing::info!("persistence disabled; running in memory only");
        None
    };

    // Build application
    let app_state = AppState::new(store, event_bus, &config);
    let app = api::build_app(app_state, Duration::from_secs(config.request_timeout_secs));

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = mirror_handle {
        handle.shutdown().await;
    }

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
