//! # Sticker Server
//!
//! Serial-sticker printing service for the production line.
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. init_tracing()            RUST_LOG or "info,sticker=debug,..."      │
//! │  2. ServerConfig::load()      defaults → TOML → STICKER_* → validate   │
//! │  3. Database::new()           SQLite (WAL) + migrations                │
//! │  4. IntegrationClient::new()  print service client with timeout        │
//! │  5. axum::serve()             until Ctrl+C / SIGTERM                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```text
//! sticker-server [--config <path>]    (or STICKER_CONFIG=<path>)
//! ```

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use sticker_core::OverrideAuthorizer;
use sticker_db::{Database, DbConfig};
use sticker_print::{IntegrationClient, PrintOrchestrator};
use sticker_server::{router, AppState, CliArgs, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    init_tracing();

    info!(version = env!("CARGO_PKG_VERSION"), "Starting sticker server");

    let config = ServerConfig::load(args.config).context("Failed to load configuration")?;
    let orchestrator_config = config.orchestrator_config();
    info!(
        bind_addr = %config.server.bind_addr,
        prefix = %orchestrator_config.serial_prefix,
        max_batch = orchestrator_config.limits.max_batch,
        warn_batch = orchestrator_config.limits.warn_batch,
        "Configuration loaded"
    );

    let authorizer = OverrideAuthorizer::new(config.override_auth.password.clone());
    if !authorizer.is_configured() {
        warn!("No override password configured; every reprint override will be refused");
    }

    // Database
    let db_path = config.database_path();
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let db_config = DbConfig::new(&db_path)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.store_timeout());
    let db = Database::new(db_config)
        .await
        .context("Failed to open the print history database")?;
    info!(path = %db_path.display(), "Print history ready");

    // Print service
    let printer = IntegrationClient::new(config.print_url()?, config.print_timeout())
        .context("Failed to create the print service client")?;
    info!(url = %printer.url(), "Print service client ready");

    let orchestrator = PrintOrchestrator::new(db.clone(), printer, authorizer, orchestrator_config);
    let app = router(AppState::new(orchestrator), config.server.static_dir.as_deref());

    let addr = config.bind_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sticker=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
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

    info!("Shutdown signal received, finishing in-flight requests");
}
