//! # Sticker Server
//!
//! HTTP API behind the operator UI on the production line.
//!
//! ## Routes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /api/send          print a range of serials                      │
//! │  POST /api/password      check the override password                   │
//! │  GET  /api/max           highest recorded serial                       │
//! │  GET  /api/getDatecode   datecode a print started now would use        │
//! │  GET  /api/batches       most recent print batches                     │
//! │  GET  /health            database reachability                         │
//! │  *                       static operator UI (optional)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The binary in `main.rs` wires a real [`IntegrationClient`]; tests plug a
//! fake printer into the same [`router`].
//!
//! [`IntegrationClient`]: sticker_print::IntegrationClient

pub mod cli;
pub mod config;
pub mod error;
pub mod routes;

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use sticker_db::Database;
use sticker_print::{PrintOrchestrator, PrintService};

pub use cli::CliArgs;
pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult, ErrorCode};

/// Orchestrator backed by the SQLite print history.
pub type Orchestrator<P> = PrintOrchestrator<Database, P>;

// =============================================================================
// Application State
// =============================================================================

/// Shared state handed to every handler.
pub struct AppState<P> {
    orchestrator: Arc<Orchestrator<P>>,
}

// Manual impl: `P` itself need not be `Clone`.
impl<P> Clone for AppState<P> {
    fn clone(&self) -> Self {
        AppState {
            orchestrator: Arc::clone(&self.orchestrator),
        }
    }
}

impl<P: PrintService> AppState<P> {
    pub fn new(orchestrator: Orchestrator<P>) -> Self {
        AppState {
            orchestrator: Arc::new(orchestrator),
        }
    }

    pub fn orchestrator(&self) -> &Orchestrator<P> {
        &self.orchestrator
    }

    pub fn db(&self) -> &Database {
        self.orchestrator.store()
    }
}

// =============================================================================
// Router
// =============================================================================

/// Builds the application router.
///
/// When `static_dir` exists, any path that is not an API route is served
/// from it.
pub fn router<P>(state: AppState<P>, static_dir: Option<&Path>) -> Router
where
    P: PrintService + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = routes::api_routes::<P>().with_state(state);

    match static_dir {
        Some(dir) if dir.is_dir() => {
            info!(dir = %dir.display(), "Serving operator UI");
            app = app.fallback_service(ServeDir::new(dir));
        }
        Some(dir) => warn!(dir = %dir.display(), "Static directory not found, UI not served"),
        None => {}
    }

    app.layer(cors).layer(TraceLayer::new_for_http())
}
