//! Read-only views of the print history.
//!
//! Reads share the orchestrator's `store_timeout`, so a locked database
//! answers with a DATABASE error instead of holding the request open.

use std::future::Future;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::warn;

use sticker_core::BatchRecord;
use sticker_db::DbError;
use sticker_print::PrintService;

use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::AppState;

const DEFAULT_BATCH_LIMIT: u32 = 50;
const MAX_BATCH_LIMIT: u32 = 500;

async fn bounded<T>(
    limit: Duration,
    operation: &'static str,
    call: impl Future<Output = Result<T, DbError>>,
) -> ApiResult<T> {
    match timeout(limit, call).await {
        Ok(result) => Ok(result?),
        Err(_) => {
            warn!(operation, ?limit, "History read timed out");
            Err(ApiError::new(
                ErrorCode::Database,
                "Print history did not respond in time",
            ))
        }
    }
}

// =============================================================================
// GET /api/max
// =============================================================================

/// Highest recorded serial index, `null` for an empty history.
#[derive(Debug, Serialize)]
pub struct MaxResponse {
    pub max: Option<u32>,
}

pub(super) async fn max<P>(State(state): State<AppState<P>>) -> ApiResult<Json<MaxResponse>>
where
    P: PrintService + 'static,
{
    let limit = state.orchestrator().config().store_timeout;
    let max = bounded(limit, "max_serial", state.db().serials().max_serial()).await?;
    Ok(Json(MaxResponse {
        max: max.map(|serial| serial.index()),
    }))
}

// =============================================================================
// GET /api/getDatecode
// =============================================================================

#[derive(Debug, Serialize)]
pub struct DatecodeResponse {
    /// `YYWW` for today.
    pub datecode: String,

    /// Product prefix printed before the datecode.
    pub prefix: String,
}

pub(super) async fn datecode<P>(State(state): State<AppState<P>>) -> Json<DatecodeResponse>
where
    P: PrintService + 'static,
{
    let orchestrator = state.orchestrator();
    Json(DatecodeResponse {
        datecode: orchestrator.current_datecode().to_string(),
        prefix: orchestrator.config().serial_prefix.clone(),
    })
}

// =============================================================================
// GET /api/batches
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub(super) struct BatchQuery {
    limit: Option<u32>,
}

/// One printed batch, as shown in the batch report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchView {
    pub id: String,
    pub first: String,
    pub last: String,
    pub copies: i64,
    pub datecode: String,
    pub reprint: bool,
    pub printed_at: DateTime<Utc>,
}

impl From<BatchRecord> for BatchView {
    fn from(record: BatchRecord) -> Self {
        BatchView {
            first: format!("{:05}", record.range_start),
            last: format!("{:05}", record.range_end),
            copies: record.copies(),
            id: record.id,
            datecode: record.datecode,
            reprint: record.reprint,
            printed_at: record.printed_at,
        }
    }
}

/// Most recent batches first. `limit` defaults to 50 and is capped at 500.
pub(super) async fn batches<P>(
    State(state): State<AppState<P>>,
    Query(query): Query<BatchQuery>,
) -> ApiResult<Json<Vec<BatchView>>>
where
    P: PrintService + 'static,
{
    let limit = query
        .limit
        .unwrap_or(DEFAULT_BATCH_LIMIT)
        .clamp(1, MAX_BATCH_LIMIT);

    let store_timeout = state.orchestrator().config().store_timeout;
    let records = bounded(
        store_timeout,
        "list_batches",
        state.db().batches().list_recent(limit),
    )
    .await?;
    Ok(Json(records.into_iter().map(BatchView::from).collect()))
}
