//! # Domain Types
//!
//! Requests and records shared by every layer of Sticker Line.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────────────┐          ┌──────────────────────┐            │
//! │  │    PrintRequest      │  print   │     BatchRecord      │            │
//! │  │  ──────────────────  │ ───────► │  ──────────────────  │            │
//! │  │  start_index         │          │  id (UUID)           │            │
//! │  │  end_index           │          │  range_start/end     │            │
//! │  │  override_requested  │          │  datecode            │            │
//! │  │  datecode / password │          │  reprint             │            │
//! │  │  confirmed           │          │  printed_at          │            │
//! │  └──────────────────────┘          └──────────────────────┘            │
//! │                                                                         │
//! │  PrintMode: Normal (guards on) │ Override (guards off, password)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::datecode::Datecode;
use crate::serial::SerialRange;

// =============================================================================
// Print Request
// =============================================================================

/// One print action as submitted by the operator.
///
/// Indices stay optional and signed so that blanks, zeros and negative input
/// reach validation and get a proper message instead of a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct PrintRequest {
    pub start_index: Option<i64>,
    pub end_index: Option<i64>,

    /// Reprint path: skip the overlap and sequence guards.
    pub override_requested: bool,

    /// Operator-typed datecode. Only honoured on override.
    pub datecode: Option<String>,

    /// Override password. Only checked on override.
    #[serde(skip_serializing)]
    pub password: Option<String>,

    /// The operator acknowledged the large-batch warning.
    pub confirmed: bool,
}

impl PrintRequest {
    /// A plain, unconfirmed request for `start..=end`.
    pub fn range(start: i64, end: i64) -> Self {
        PrintRequest {
            start_index: Some(start),
            end_index: Some(end),
            ..Default::default()
        }
    }

    pub fn mode(&self) -> PrintMode {
        if self.override_requested {
            PrintMode::Override
        } else {
            PrintMode::Normal
        }
    }
}

/// Which set of guards applies to a print action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum PrintMode {
    /// Overlap and sequence guards enforced.
    Normal,
    /// Authorized reprint; guards bypassed.
    Override,
}

// =============================================================================
// Batch Record
// =============================================================================

/// Metadata for one successful print action.
///
/// Written after the serials themselves; losing it never invalidates the
/// serial history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct BatchRecord {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// First index of the printed range.
    pub range_start: i64,

    /// Last index of the printed range.
    pub range_end: i64,

    /// Datecode printed on the labels.
    pub datecode: String,

    /// Printed through the override path.
    pub reprint: bool,

    #[ts(as = "String")]
    pub printed_at: DateTime<Utc>,
}

impl BatchRecord {
    /// Builds the record for a printed range.
    pub fn new(
        range: SerialRange,
        datecode: &Datecode,
        reprint: bool,
        printed_at: DateTime<Utc>,
    ) -> Self {
        BatchRecord {
            id: Uuid::new_v4().to_string(),
            range_start: i64::from(range.first().index()),
            range_end: i64::from(range.last().index()),
            datecode: datecode.as_str().to_string(),
            reprint,
            printed_at,
        }
    }

    /// Number of labels in the batch.
    pub fn copies(&self) -> i64 {
        self.range_end - self.range_start + 1
    }
}
