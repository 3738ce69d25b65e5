//! # Error Types
//!
//! Domain-specific error types for sticker-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  sticker-core errors (this file)                                       │
//! │  ├── CoreError        - Why a print request cannot go ahead            │
//! │  ├── ValidationError  - Malformed or over-capacity index range         │
//! │  └── DatecodeError    - Bad operator-supplied datecode                 │
//! │                                                                         │
//! │  sticker-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  sticker-print errors (separate crate)                                 │
//! │  └── PrintError       - Aborted / failed print actions                 │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → PrintError → ApiError → Operator  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (indices, serials, limits)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to an operator-facing message

use thiserror::Error;

use crate::serial::SerialNumber;

// =============================================================================
// Core Error
// =============================================================================

/// Reasons a print request is refused before anything is printed.
///
/// Every variant is a "nothing happened" outcome: no label was printed and no
/// history row was written.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The requested range failed policy checks.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The operator-supplied datecode is malformed.
    #[error(transparent)]
    Datecode(#[from] DatecodeError),

    /// A large batch was requested without confirmation.
    #[error("{message}. Confirm to continue")]
    ConfirmationRequired { message: String },

    /// Some of the requested serials were already printed.
    ///
    /// ## User Workflow
    /// ```text
    /// History: 00100..=00105
    /// Request: 00103..=00110 (no override)
    ///      │
    ///      ▼
    /// AlreadyPrinted { first: 00103, last: 00105 }
    ///      │
    ///      ▼
    /// UI shows: "Serials already printed: 00103 - 00105"
    ///           and offers the Reprint button
    /// ```
    #[error("Serials already printed: {first} - {last}")]
    AlreadyPrinted {
        first: SerialNumber,
        last: SerialNumber,
    },

    /// The first requested serial skips ahead of the recorded history.
    #[error(
        "First index breaks sequence: expected {next_expected} but got {requested}. \
         Check the last printed value"
    )]
    SequenceGap {
        next_expected: SerialNumber,
        requested: SerialNumber,
    },

    /// Override requested with a missing or wrong password.
    #[error("Invalid override password")]
    OverrideDenied,
}

impl CoreError {
    /// Whether a valid override would let this request through.
    pub fn is_overridable(&self) -> bool {
        matches!(self, CoreError::AlreadyPrinted { .. } | CoreError::SequenceGap { .. })
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Index range validation errors.
///
/// Evaluated before any store access, in the order the variants are listed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Start or end index is missing, zero or not a number.
    #[error("Indices required")]
    IndicesRequired,

    /// End index is before start index.
    #[error("Invalid numbers: end index {end} is before start index {start}")]
    InvalidNumbers { start: i64, end: i64 },

    /// Index cannot be encoded as a 5-digit serial.
    #[error("Index {index} is outside the printable range 1-{max}")]
    IndexOutOfRange { index: i64, max: u32 },

    /// More labels than the hard cap.
    #[error("Exceeds max batch size: {copies} labels requested, at most {max} per print")]
    ExceedsMaxBatch { copies: u32, max: u32 },

    /// Stored or supplied serial text is not in canonical 5-digit form.
    #[error("Malformed serial '{value}': expected 5 digits")]
    MalformedSerial { value: String },
}

// =============================================================================
// Datecode Error
// =============================================================================

/// Operator-supplied datecode errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatecodeError {
    #[error("Datecode must be exactly 4 digits, got {len} characters")]
    WrongLength { len: usize },

    #[error("Datecode must contain only digits: '{value}'")]
    NonNumeric { value: String },

    #[error("Datecode week {week} is invalid (maximum 52)")]
    WeekOutOfRange { week: u32 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
