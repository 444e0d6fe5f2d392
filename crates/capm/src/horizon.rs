//! Lookback horizon in calendar years.

use crate::{CapmError, Result};
use chrono::{Datelike, NaiveDate};
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Shortest supported horizon in years.
pub const MIN_YEARS: u32 = 1;

/// Longest supported horizon in years.
pub const MAX_YEARS: u32 = 10;

/// A lookback horizon of whole calendar years ending at a given date.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[display("{_0}y")]
pub struct Horizon(u32);

impl Horizon {
    /// Create a horizon of `years` years.
    ///
    /// # Errors
    ///
    /// Returns [`CapmError::InvalidHorizon`] outside `1..=10`.
    pub const fn years(years: u32) -> Result<Self> {
        if years < MIN_YEARS || years > MAX_YEARS {
            return Err(CapmError::InvalidHorizon(years));
        }
        Ok(Self(years))
    }

    /// Number of years covered.
    pub const fn as_years(&self) -> u32 {
        self.0
    }

    /// Date `years` years before `end`, on the same month and day.
    ///
    /// A Feb 29 end date maps to Feb 28 when the start year is not a leap year.
    pub fn start(&self, end: NaiveDate) -> NaiveDate {
        let year = end.year() - self.0 as i32;
        NaiveDate::from_ymd_opt(year, end.month(), end.day())
            .or_else(|| NaiveDate::from_ymd_opt(year, end.month(), end.day() - 1))
            .unwrap_or(end)
    }

    /// The inclusive `(start, end)` window ending at `end`.
    pub fn window(&self, end: NaiveDate) -> (NaiveDate, NaiveDate) {
        (self.start(end), end)
    }
}

impl Default for Horizon {
    fn default() -> Self {
        Self(MIN_YEARS)
    }
}
