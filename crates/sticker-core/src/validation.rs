//! # Validation Module
//!
//! Range policy checks that run before any side effect.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Operator UI (JavaScript)                                     │
//! │  ├── Digits-only inputs                                                │
//! │  └── Immediate confirm/alert dialogs                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Server (Rust)                                                │
//! │  ├── JSON → indices (lenient: numbers or digit strings)                │
//! │  └── THIS MODULE: ordering, 5-digit bound, hard cap, soft warning      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE serial_number                                              │
//! │  └── CHECK length(serial_number) = 5                                   │
//! │                                                                         │
//! │  The UNIQUE constraint is the real duplicate guard. Everything above   │
//! │  it exists to give the operator an early, readable answer.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rule Order
//! Errors always win over warnings:
//! 1. Missing or zero index → [`ValidationError::IndicesRequired`]
//! 2. End before start → [`ValidationError::InvalidNumbers`]
//! 3. Index not encodable in 5 digits → [`ValidationError::IndexOutOfRange`]
//! 4. More than `max_batch` labels → [`ValidationError::ExceedsMaxBatch`]
//! 5. More than `warn_batch` labels → [`BatchWarning::LargeBatch`]

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::serial::{SerialRange, MAX_SERIAL_INDEX};
use crate::{LARGE_BATCH_THRESHOLD, MAX_BATCH_SIZE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Batch Limits
// =============================================================================

/// Capacity policy for a single print action.
///
/// Limits count labels (copies), so `100..=600` is 501 labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchLimits {
    /// Hard cap. Larger batches are rejected.
    #[serde(default = "default_max_batch")]
    pub max_batch: u32,

    /// Soft threshold. Larger batches need confirmation.
    #[serde(default = "default_warn_batch")]
    pub warn_batch: u32,
}

fn default_max_batch() -> u32 {
    MAX_BATCH_SIZE
}

fn default_warn_batch() -> u32 {
    LARGE_BATCH_THRESHOLD
}

impl Default for BatchLimits {
    fn default() -> Self {
        BatchLimits {
            max_batch: default_max_batch(),
            warn_batch: default_warn_batch(),
        }
    }
}

// =============================================================================
// Validation Outcome
// =============================================================================

/// A non-fatal condition the operator must acknowledge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchWarning {
    /// More labels than the soft threshold.
    LargeBatch { copies: u32, threshold: u32 },
}

impl fmt::Display for BatchWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchWarning::LargeBatch { copies, threshold } => write!(
                f,
                "Large batch: printing {} labels (more than {})",
                copies, threshold
            ),
        }
    }
}

/// A range that passed every hard rule, possibly with a warning attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedRange {
    pub range: SerialRange,
    pub warning: Option<BatchWarning>,
}

// =============================================================================
// Range Validator
// =============================================================================

/// Validates a requested index range.
///
/// Indices are optional because the operator form can submit blanks; `None`
/// and `Some(0)` both mean "not filled in".
///
/// ## Example
/// ```rust
/// use sticker_core::validation::{validate_range, BatchLimits};
///
/// let limits = BatchLimits::default();
/// assert!(validate_range(Some(100), Some(99), &limits).is_err());
/// assert!(validate_range(Some(100), Some(600), &limits).is_err());
/// assert!(validate_range(Some(100), Some(250), &limits).unwrap().warning.is_some());
/// assert!(validate_range(Some(100), Some(150), &limits).unwrap().warning.is_none());
/// ```
pub fn validate_range(
    start: Option<i64>,
    end: Option<i64>,
    limits: &BatchLimits,
) -> ValidationResult<ValidatedRange> {
    let (start, end) = match (start, end) {
        (Some(start), Some(end)) if start != 0 && end != 0 => (start, end),
        _ => return Err(ValidationError::IndicesRequired),
    };

    if end < start {
        return Err(ValidationError::InvalidNumbers { start, end });
    }

    let start_index = to_serial_index(start)?;
    let end_index = to_serial_index(end)?;
    let range = SerialRange::from_indices(start_index, end_index)?;

    let copies = range.copies();
    if copies > limits.max_batch {
        return Err(ValidationError::ExceedsMaxBatch {
            copies,
            max: limits.max_batch,
        });
    }

    let warning = (copies > limits.warn_batch).then_some(BatchWarning::LargeBatch {
        copies,
        threshold: limits.warn_batch,
    });

    Ok(ValidatedRange { range, warning })
}

fn to_serial_index(index: i64) -> ValidationResult<u32> {
    u32::try_from(index)
        .ok()
        .filter(|i| *i <= MAX_SERIAL_INDEX)
        .ok_or(ValidationError::IndexOutOfRange {
            index,
            max: MAX_SERIAL_INDEX,
        })
}

// =============================================================================
// Unit Tests
// =============================================================================
