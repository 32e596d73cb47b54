//! Punchclock Server - Main entry point
//!
//! Serves the clock store over JSON-RPC.

use anyhow::Context;
use std::sync::Arc;

use punchclock_core::{
    api::{self, AppState},
    config::Config,
    persistence::{JsonFileBackend, MemoryBackend, SnapshotBackend},
    service::{ClockService, SystemTimeSource},
    telemetry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = match std::env::var("PUNCHCLOCK_CONFIG") {
        Ok(path) => Config::from_file(&path).with_context(|| format!("Failed to load config from {}", path))?,
        Err(_) => Config::load().unwrap_or_else(|e| {
            eprintln!("Warning: Could not load config: {}. Using defaults.", e);
            Config::default()
        }),
    };

    telemetry::init_telemetry(&config.observability.logging())?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Punchclock Server"
    );

    let backend: Arc<dyn SnapshotBackend> = if config.storage.ephemeral {
        tracing::warn!("Ephemeral storage: clock history will not survive a restart");
        Arc::new(MemoryBackend::new())
    } else {
        Arc::new(JsonFileBackend::new(&config.storage.path))
    };

    // A store that cannot be loaded is fatal at startup.
    let service = ClockService::open(backend, Arc::new(SystemTimeSource), config.storage.retention())
        .await
        .map_err(|e| {
            e.log();
            anyhow::anyhow!("Failed to open clock store: {}", e)
        })?;

    let app = api::build_router(AppState::new(Arc::new(service)));

    let addr = config.server.bind_address();
    tracing::info!(address = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Wait for shutdown signal.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
