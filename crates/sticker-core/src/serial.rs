//! # Serial Numbers
//!
//! The 5-digit serial printed on each sticker and the contiguous ranges an
//! operator requests.
//!
//! ## Fixed Width Is Load-Bearing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Why every serial is 5 digits                         │
//! │                                                                         │
//! │  Stored as TEXT:  "00099" < "00100" < "01000"   ✓ numeric order         │
//! │                                                                         │
//! │  Unpadded TEXT:   "99"    > "100"               ✗ lexicographic order   │
//! │                                                                         │
//! │  The history table compares serials with BETWEEN and MAX on the text   │
//! │  column. Those are only numerically correct while every stored value   │
//! │  has the same width, so SerialNumber can only be built from an index   │
//! │  that fits in 5 digits and always renders with zero padding.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::datecode::Datecode;
use crate::error::ValidationError;

/// Number of digits in a serial.
pub const SERIAL_WIDTH: usize = 5;

/// Largest index that fits in [`SERIAL_WIDTH`] digits.
pub const MAX_SERIAL_INDEX: u32 = 99_999;

// =============================================================================
// Serial Number
// =============================================================================

/// A single 5-digit serial, e.g. index 42 → `"00042"`.
///
/// Ordering is numeric. The canonical text form is produced by `Display`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SerialNumber(u32);

impl SerialNumber {
    /// Creates a serial from an integer index.
    pub fn new(index: u32) -> Result<Self, ValidationError> {
        if index > MAX_SERIAL_INDEX {
            return Err(ValidationError::IndexOutOfRange {
                index: i64::from(index),
                max: MAX_SERIAL_INDEX,
            });
        }
        Ok(SerialNumber(index))
    }

    /// Returns the integer index.
    #[inline]
    pub const fn index(&self) -> u32 {
        self.0
    }

    /// Returns the serial immediately after this one, if it still fits.
    pub fn next(&self) -> Option<SerialNumber> {
        SerialNumber::new(self.0 + 1).ok()
    }

    /// Builds the fully qualified label serial: prefix + datecode + serial.
    ///
    /// ## Example
    /// ```rust
    /// use sticker_core::{Datecode, SerialNumber};
    ///
    /// let datecode = Datecode::parse("2503").unwrap();
    /// let serial = SerialNumber::new(42).unwrap();
    /// assert_eq!(serial.qualified("APBUAESA", &datecode), "APBUAESA250300042");
    /// ```
    pub fn qualified(&self, prefix: &str, datecode: &Datecode) -> String {
        format!("{}{}{}", prefix, datecode, self)
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$}", self.0, width = SERIAL_WIDTH)
    }
}

impl FromStr for SerialNumber {
    type Err = ValidationError;

    /// Parses the canonical form only: exactly 5 ASCII digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ValidationError::MalformedSerial {
            value: s.to_string(),
        };
        if s.len() != SERIAL_WIDTH || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        let index: u32 = s.parse().map_err(|_| malformed())?;
        SerialNumber::new(index)
    }
}

impl TryFrom<String> for SerialNumber {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SerialNumber> for String {
    fn from(serial: SerialNumber) -> Self {
        serial.to_string()
    }
}

// =============================================================================
// Serial Range (the range calculator)
// =============================================================================

/// An inclusive, non-empty range of serials: one print batch.
///
/// ## Invariants
/// - `first <= last`
/// - `copies() == last - first + 1 >= 1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SerialRange {
    first: SerialNumber,
    last: SerialNumber,
}

impl SerialRange {
    /// Creates a range from two serials.
    pub fn new(first: SerialNumber, last: SerialNumber) -> Result<Self, ValidationError> {
        if last < first {
            return Err(ValidationError::InvalidNumbers {
                start: i64::from(first.index()),
                end: i64::from(last.index()),
            });
        }
        Ok(SerialRange { first, last })
    }

    /// Creates a range from raw integer indices.
    pub fn from_indices(start: u32, end: u32) -> Result<Self, ValidationError> {
        SerialRange::new(SerialNumber::new(start)?, SerialNumber::new(end)?)
    }

    #[inline]
    pub fn first(&self) -> SerialNumber {
        self.first
    }

    #[inline]
    pub fn last(&self) -> SerialNumber {
        self.last
    }

    /// Number of labels in the batch. The first serial is printed too, so
    /// 100..=101 is two copies.
    #[inline]
    pub fn copies(&self) -> u32 {
        self.last.index() - self.first.index() + 1
    }

    /// Iterates the serials in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = SerialNumber> {
        (self.first.index()..=self.last.index()).map(SerialNumber)
    }

    /// Expands the range into its ordered list of serials.
    ///
    /// ## Example
    /// ```rust
    /// use sticker_core::SerialRange;
    ///
    /// let range = SerialRange::from_indices(98, 101).unwrap();
    /// let serials: Vec<String> = range.serials().iter().map(|s| s.to_string()).collect();
    /// assert_eq!(serials, ["00098", "00099", "00100", "00101"]);
    /// ```
    pub fn serials(&self) -> Vec<SerialNumber> {
        self.iter().collect()
    }
}

impl fmt::Display for SerialRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.first, self.last)
    }
}

// =============================================================================
// Serial Span
// =============================================================================

/// The min and max of an arbitrary set of serials.
///
/// Used to report which part of a request collides with the history. The
/// span is not necessarily contiguous in the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialSpan {
    pub min: SerialNumber,
    pub max: SerialNumber,
}

impl SerialSpan {
    /// Returns the span covering `serials`, or `None` for an empty set.
    pub fn covering<I>(serials: I) -> Option<SerialSpan>
    where
        I: IntoIterator<Item = SerialNumber>,
    {
        serials.into_iter().fold(None, |span, serial| match span {
            None => Some(SerialSpan {
                min: serial,
                max: serial,
            }),
            Some(SerialSpan { min, max }) => Some(SerialSpan {
                min: min.min(serial),
                max: max.max(serial),
            }),
        })
    }
}

impl fmt::Display for SerialSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.min, self.max)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
