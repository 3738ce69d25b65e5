//! # sticker-core: Pure Serial Allocation Logic for Sticker Line
//!
//! This crate is the **heart** of Sticker Line. It decides which serial
//! numbers a print request covers and whether that request is allowed, as
//! pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Sticker Line Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Operator UI (browser form)                         │   │
//! │  │    Start / End index ──► Print / Reprint ──► Result alert       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              sticker-server (axum) + sticker-print              │   │
//! │  │         /api/send ──► PrintOrchestrator ──► print service       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ sticker-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │  ┌──────────┐ ┌────────────┐ ┌──────────┐ ┌──────────┐ ┌──────┐ │   │
//! │  │  │  serial  │ │ validation │ │ datecode │ │ sequence │ │ auth │ │   │
//! │  │  └──────────┘ └────────────┘ └──────────┘ └──────────┘ └──────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  sticker-db (Database Layer)                    │   │
//! │  │            printed_serials, print_batches, migrations           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`serial`] - `SerialNumber` and `SerialRange` (the range calculator)
//! - [`validation`] - Range policy checks (ordering, hard cap, soft warning)
//! - [`datecode`] - YYWW datecode derivation and operator input validation
//! - [`sequence`] - Forward gap detection against the print history
//! - [`authorizer`] - Override shared-secret check
//! - [`types`] - Print requests and batch records
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use sticker_core::validation::{validate_range, BatchLimits};
//!
//! let checked = validate_range(Some(100), Some(150), &BatchLimits::default()).unwrap();
//! assert_eq!(checked.range.copies(), 51);
//! assert_eq!(checked.range.first().to_string(), "00100");
//! assert!(checked.warning.is_none());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod authorizer;
pub mod datecode;
pub mod error;
pub mod sequence;
pub mod serial;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use authorizer::OverrideAuthorizer;
pub use datecode::Datecode;
pub use error::{CoreError, CoreResult, DatecodeError, ValidationError};
pub use serial::{SerialNumber, SerialRange, SerialSpan};
pub use types::*;
pub use validation::{BatchLimits, BatchWarning, ValidatedRange};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Fixed prefix printed in front of the datecode on every label.
///
/// The full printed serial is `PREFIX + YYWW + NNNNN`, for example
/// `APBUAESA250300042`.
pub const DEFAULT_SERIAL_PREFIX: &str = "APBUAESA";

/// Hard cap on labels per print action.
///
/// ## Business Reason
/// The label printer queue chokes on very large jobs and a typo in the end
/// index would otherwise burn a whole roll.
pub const MAX_BATCH_SIZE: u32 = 500;

/// Batches above this size need explicit operator confirmation.
pub const LARGE_BATCH_THRESHOLD: u32 = 100;
