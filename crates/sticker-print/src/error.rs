//! # Print Errors
//!
//! ## Classification
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PrintError                     ErrorKind          Printed?            │
//! │  ─────────────────────────────  ─────────────────  ────────            │
//! │  Rejected(Validation/Datecode/  Input              no                  │
//! │           ConfirmationRequired)                                        │
//! │  Rejected(AlreadyPrinted/       Conflict           no                  │
//! │           SequenceGap)                                                 │
//! │  Rejected(OverrideDenied)       Authorization      no                  │
//! │  HistoryUnavailable             Storage            no                  │
//! │  PrintFailed                    DependentService   no                  │
//! │  NotRecorded                    Bookkeeping        YES                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything above the last row is safe to retry. `NotRecorded` is not:
//! the labels exist and the history does not know about them.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use sticker_core::{CoreError, SerialRange};
use sticker_db::DbError;

// =============================================================================
// Store Error
// =============================================================================

/// Failures of the print history store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A serial is already recorded (UNIQUE constraint).
    #[error("Serial {serial} is already recorded")]
    Duplicate { serial: String },

    /// The store did not answer within the configured timeout.
    #[error("Print history did not respond to {operation} in time")]
    Timeout { operation: &'static str },

    /// Any other store failure.
    #[error("Print history unavailable: {0}")]
    Unavailable(String),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation { value, .. } => StoreError::Duplicate { serial: value },
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

// =============================================================================
// Print Service Error
// =============================================================================

/// Failures of the external label print service.
#[derive(Debug, Error)]
pub enum PrintServiceError {
    /// Connection refused, DNS failure or non-2xx HTTP status.
    #[error("Could not reach the print service: {0}")]
    Unreachable(String),

    /// No answer within the print timeout.
    #[error("Could not reach the print service: timed out after {after:?}")]
    Timeout { after: Duration },

    /// The service answered but the body was not understood.
    #[error("Print service sent an unreadable response: {0}")]
    InvalidResponse(String),

    /// The service answered and reported the job did not complete.
    #[error("Something went wrong with the print (status: {status})")]
    Rejected { status: String },

    /// The HTTP client could not be built.
    #[error("Print client setup failed: {0}")]
    Setup(String),
}

impl From<reqwest::Error> for PrintServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            PrintServiceError::InvalidResponse(err.to_string())
        } else {
            PrintServiceError::Unreachable(err.to_string())
        }
    }
}

// =============================================================================
// Print Error
// =============================================================================

/// Error classes shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    Conflict,
    Authorization,
    /// The print history could not be read before printing.
    Storage,
    /// The print service failed.
    DependentService,
    Bookkeeping,
}

impl ErrorKind {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Input => "INPUT",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::Authorization => "UNAUTHORIZED",
            ErrorKind::Storage => "DATABASE",
            ErrorKind::DependentService => "PRINT_SERVICE",
            ErrorKind::Bookkeeping => "NOT_RECORDED",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Why a print action did not complete.
#[derive(Debug, Error)]
pub enum PrintError {
    /// Refused before printing by a policy check.
    #[error(transparent)]
    Rejected(#[from] CoreError),

    /// The history could not be read before printing.
    #[error("{0}. Nothing was printed")]
    HistoryUnavailable(#[source] StoreError),

    /// The print service failed. No history was written.
    #[error("{0}. Nothing was recorded")]
    PrintFailed(#[source] PrintServiceError),

    /// The labels were printed but the serials were not recorded.
    #[error(
        "Labels {range} were printed but could not be recorded ({source}). \
         Record them before printing again"
    )]
    NotRecorded {
        range: SerialRange,
        #[source]
        source: StoreError,
    },
}

impl PrintError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PrintError::Rejected(core) => match core {
                CoreError::Validation(_)
                | CoreError::Datecode(_)
                | CoreError::ConfirmationRequired { .. } => ErrorKind::Input,
                CoreError::AlreadyPrinted { .. } | CoreError::SequenceGap { .. } => {
                    ErrorKind::Conflict
                }
                CoreError::OverrideDenied => ErrorKind::Authorization,
            },
            PrintError::HistoryUnavailable(_) => ErrorKind::Storage,
            PrintError::PrintFailed(_) => ErrorKind::DependentService,
            PrintError::NotRecorded { .. } => ErrorKind::Bookkeeping,
        }
    }

    /// Whether a valid override would let the same request through.
    pub fn overridable(&self) -> bool {
        matches!(self, PrintError::Rejected(core) if core.is_overridable())
    }

    /// Whether the operator must confirm a large batch and resend.
    pub fn needs_confirmation(&self) -> bool {
        matches!(
            self,
            PrintError::Rejected(CoreError::ConfirmationRequired { .. })
        )
    }

    /// Whether physical labels came out of the printer.
    pub fn printed(&self) -> bool {
        matches!(self, PrintError::NotRecorded { .. })
    }
}
