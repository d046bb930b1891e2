//! Queztl Core Server - live testing & monitoring service
//!
//! Serves the HTTP API and the `/ws/metrics` stream. Metrics are pushed via
//! structured JSON logs to stdout and exposed on `/metrics`.
//!
//! # Usage
//! ```sh
//! SERVER_PORT=8000 OBSERVABILITY_INTERVAL=60 cargo run --bin server
//! ```
//!
//! # Environment Variables
//! - `SERVER_BIND_ADDRESS` / `SERVER_PORT` - Listen address (default: 0.0.0.0:8000)
//! - `TRAINING_ITERATION_PAUSE_MS` - Pause between training iterations (default: 2000)
//! - `DATABASE_URL` - SQLite URL for execution results (default: in-memory)
//! - `OBSERVABILITY_ENABLED` - Enable metrics reporting (default: true)
//! - `OBSERVABILITY_INTERVAL` - Interval in seconds between metric outputs (default: 60)

use anyhow::{Context, Result};
use queztl_core::application::system::Application;
use queztl_core::config::Config;
use queztl_core::interfaces::router;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false).pretty();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("Queztl Core Server {} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: Listen={}, TrainingPause={}ms, Store={}",
        config.server.listen_addr(),
        config.training.iteration_pause_ms,
        if config.persistence.database_url.is_some() {
            "sqlite"
        } else {
            "memory"
        }
    );

    let app = Arc::new(Application::build(config.clone()).await?);

    if let Some(reporter) = app.metrics_reporter() {
        tokio::spawn(async move {
            reporter.run().await;
        });
        info!(
            "Metrics reporter started (interval: {}s)",
            config.observability.interval_seconds
        );
    } else {
        info!("Metrics reporting disabled.");
    }

    let listen_addr = config.server.listen_addr();
    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", listen_addr))?;
    info!("Server listening on {}. Press Ctrl+C to shutdown.", listen_addr);

    let shutdown = app.shutdown_service();
    axum::serve(listener, router(app.clone()))
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutdown signal received.");
            shutdown.shutdown().await;
        })
        .await
        .context("HTTP server failed")?;

    info!("Exiting...");
    Ok(())
}
