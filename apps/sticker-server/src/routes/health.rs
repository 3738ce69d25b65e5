//! Health check endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use tracing::warn;

use sticker_print::PrintService;

use crate::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    database: bool,
    migrations_applied: Option<usize>,
    migrations_total: Option<usize>,
}

/// `200 {"status":"ok"}` when the database answers, `503` otherwise.
pub(super) async fn health<P>(State(state): State<AppState<P>>) -> impl IntoResponse
where
    P: PrintService + 'static,
{
    let db = state.db();
    let database = db.health_check().await;
    let (migrations_total, migrations_applied) = match db.migration_status().await {
        Ok((total, applied)) => (Some(total), Some(applied)),
        Err(e) => {
            warn!(error = %e, "Could not read migration status");
            (None, None)
        }
    };

    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if database { "ok" } else { "unavailable" },
            database,
            migrations_applied,
            migrations_total,
        }),
    )
}
