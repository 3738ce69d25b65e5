//! # Sequence Guard
//!
//! Stops a normal print from silently skipping ahead of the last recorded
//! serial.
//!
//! ```text
//!   history max = 00050           next expected = 00051
//!
//!   request starts at 00052  ──►  rejected (gap of one label)
//!   request starts at 00051  ──►  accepted
//!   request starts at 00040  ──►  accepted (backward, overlap check decides)
//! ```
//!
//! This only detects forward gaps. Backward requests are left to the overlap
//! check, and override prints skip this guard entirely.

use crate::error::CoreError;
use crate::serial::SerialNumber;

/// Checks that `first` does not start past the serial after `max_recorded`.
///
/// An empty history has nothing to continue from, so any start is accepted
/// and the first batch establishes the sequence.
pub fn check_sequence(
    max_recorded: Option<SerialNumber>,
    first: SerialNumber,
) -> Result<(), CoreError> {
    let Some(max) = max_recorded else {
        return Ok(());
    };

    // At 99999 there is no next serial; validation already caps requests there.
    let Some(next_expected) = max.next() else {
        return Ok(());
    };

    if first > next_expected {
        return Err(CoreError::SequenceGap {
            next_expected,
            requested: first,
        });
    }

    Ok(())
}
