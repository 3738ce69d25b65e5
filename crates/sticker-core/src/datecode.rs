//! # Datecode
//!
//! The 4-digit `YYWW` code printed between the prefix and the serial.
//!
//! ```text
//!   APBUAESA  25 03  00042
//!   ───┬────  ─┬ ─┬  ──┬──
//!      │       │  │    └── serial (5 digits)
//!      │       │  └─────── ISO week, zero padded
//!      │       └────────── last two digits of the ISO week-numbering year
//!      └────────────────── fixed prefix
//! ```
//!
//! The code is derived from the calendar on normal prints. On an override
//! (reprint) the operator may type the datecode of the original run instead;
//! that input is validated with [`Datecode::parse`].

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::error::DatecodeError;

/// Highest week accepted from operator input.
pub const MAX_OPERATOR_WEEK: u32 = 52;

/// A validated 4-digit datecode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Datecode(String);

impl Datecode {
    /// Derives the datecode for a calendar date.
    ///
    /// Year and week both come from the ISO week date, so the last days of
    /// December that belong to week 1 produce the next year's code.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::NaiveDate;
    /// use sticker_core::Datecode;
    ///
    /// let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
    /// assert_eq!(Datecode::for_date(date).as_str(), "2503");
    /// ```
    pub fn for_date(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        let year = iso.year().rem_euclid(100);
        Datecode(format!("{:02}{:02}", year, iso.week()))
    }

    /// Validates an operator-supplied datecode.
    ///
    /// ## Rules
    /// - Exactly 4 characters
    /// - All characters are ASCII digits
    /// - The week (last two digits) is at most 52
    pub fn parse(input: &str) -> Result<Self, DatecodeError> {
        let len = input.chars().count();
        if len != 4 {
            return Err(DatecodeError::WrongLength { len });
        }

        if !input.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DatecodeError::NonNumeric {
                value: input.to_string(),
            });
        }

        let week: u32 = input[2..]
            .parse()
            .map_err(|_| DatecodeError::NonNumeric {
                value: input.to_string(),
            })?;
        if week > MAX_OPERATOR_WEEK {
            return Err(DatecodeError::WeekOutOfRange { week });
        }

        Ok(Datecode(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Datecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
