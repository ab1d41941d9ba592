//! # Harbor HQ API
//!
//! HTTP server for store terminals and the head-office dashboard.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        HQ API Server                                    │
//! │                                                                         │
//! │  Terminal ───► HTTP (8080) ───► handlers ───► harbor-db ───► SQLite    │
//! │  Dashboard ──┘                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use harbor_db::Database;
use harbor_hq_api::{router, AppState, HqConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,harbor_db=debug")),
        )
        .with_target(true)
        .init();

    info!("Starting Harbor HQ API server...");

    // Load configuration
    let config = HqConfig::load().context("loading configuration")?;
    let addr = config.bind_addr()?;
    info!(
        %addr,
        database = %config.database_path.display(),
        max_connections = config.db_max_connections,
        "Configuration loaded"
    );

    if let Some(parent) = config.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }

    // Open database (runs migrations)
    let db = Database::new(config.db_config())
        .await
        .context("opening database")?
        .with_service_config(config.service_config());
    info!("Database ready");

    let app = router(AppState::new(db.clone()));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
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
                error!(error = %e, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received, starting graceful shutdown...");
}
