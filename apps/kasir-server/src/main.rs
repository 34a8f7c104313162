//! # Kasir Server binary
//!
//! ```text
//! env ──► ServerConfig ──► Database (migrations) ──► router ──► axum::serve
//!                                                                  │
//!                                          Ctrl+C / SIGTERM ───────┘ graceful
//! ```

use anyhow::Context;
use kasir_db::{Database, DbConfig};
use kasir_server::{router, AppState, ServerConfig};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,kasir=debug,sqlx=warn")),
        )
        .with_target(true)
        .init();

    info!("Starting Kasir POS server...");

    let config = ServerConfig::load().context("loading configuration")?;
    info!(
        host = %config.host,
        port = config.port,
        db_path = %config.db_path,
        acting_user_id = config.acting_user_id,
        "Configuration loaded"
    );

    let db = Database::new(DbConfig::new(&config.db_path).max_connections(config.db_max_connections))
        .await
        .with_context(|| format!("opening database at {}", config.db_path))?;

    let app = router(AppState::new(db.clone(), config.acting_user_id));

    let listener = TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("binding {}", config.bind_address()))?;
    info!(addr = %listener.local_addr()?, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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
