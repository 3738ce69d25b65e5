//! # API Error Type
//!
//! Every failed request answers with the same JSON shape:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP   code            body                                            │
//! │  ────   ─────────────   ──────────────────────────────────────────────  │
//! │  400    INPUT           {"err": "Invalid request body: ...",            │
//! │                          "code": "INPUT"}               (bad JSON)      │
//! │  400    INPUT           {"err": "...", "code": "INPUT",                 │
//! │                          "needsConfirmation": true}     (large batch)   │
//! │  409    CONFLICT        {"err": "Serials already printed: 00103 -       │
//! │                          00105", "code": "CONFLICT",                    │
//! │                          "overridable": true}                           │
//! │  401    UNAUTHORIZED    {"err": "...", "code": "UNAUTHORIZED"}          │
//! │  502    PRINT_SERVICE   {"err": "Could not reach the print service..."} │
//! │  500    NOT_RECORDED    {"err": "Labels ... were printed but ...",      │
//! │                          "printed": true}                               │
//! │  500    DATABASE        {"err": "Database operation failed"}            │
//! │  500    DATABASE        {"err": "Print history did not respond ..."}    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The UI reads `err` for the message and `overridable` to decide whether to
//! offer the reprint prompt. Flags that are false are left out.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use sticker_db::DbError;
use sticker_print::{ErrorKind, PrintError};

/// Machine-readable error class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Input,
    Conflict,
    Unauthorized,
    PrintService,
    NotRecorded,
    Database,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::Input => StatusCode::BAD_REQUEST,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::PrintService => StatusCode::BAD_GATEWAY,
            ErrorCode::NotRecorded | ErrorCode::Database => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ErrorKind> for ErrorCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Input => ErrorCode::Input,
            ErrorKind::Conflict => ErrorCode::Conflict,
            ErrorKind::Authorization => ErrorCode::Unauthorized,
            ErrorKind::DependentService => ErrorCode::PrintService,
            ErrorKind::Storage => ErrorCode::Database,
            ErrorKind::Bookkeeping => ErrorCode::NotRecorded,
        }
    }
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

/// Error body returned by every API route.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Operator-facing message.
    pub err: String,

    pub code: ErrorCode,

    /// A valid override would let the same request through.
    #[serde(skip_serializing_if = "is_false")]
    pub overridable: bool,

    /// Resend with `confirmed: true` to go ahead.
    #[serde(skip_serializing_if = "is_false")]
    pub needs_confirmation: bool,

    /// Labels were physically printed despite the error.
    #[serde(skip_serializing_if = "is_false")]
    pub printed: bool,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            err: message.into(),
            code,
            overridable: false,
            needs_confirmation: false,
            printed: false,
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Input, message)
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

impl From<PrintError> for ApiError {
    fn from(err: PrintError) -> Self {
        if err.printed() {
            error!(error = %err, "Labels printed but not recorded");
        }
        ApiError {
            err: err.to_string(),
            code: err.kind().into(),
            overridable: err.overridable(),
            needs_confirmation: err.needs_confirmation(),
            printed: err.printed(),
        }
    }
}

/// Malformed JSON, wrong field types or a missing content type.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::input(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        error!(error = %err, "Database operation failed");
        ApiError::new(ErrorCode::Database, "Database operation failed")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
