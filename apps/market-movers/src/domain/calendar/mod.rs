//! Trading Calendar Types
//!
//! Validation of requested calendar dates against the rules for which a
//! movers list can exist: a real Gregorian date, a year between the first
//! archived year and today, and a weekday.
//!
//! # Design
//!
//! "Today" is read through the [`Clock`] trait so validation stays pure and
//! deterministic under test. Production code uses [`SystemClock`].

use std::fmt;

use chrono::{Datelike, NaiveDate, Utc, Weekday};

/// First year for which movers lists are archived.
pub const FIRST_ARCHIVED_YEAR: i32 = 2010;

// =============================================================================
// Clock
// =============================================================================

/// Source of the current calendar date.
pub trait Clock: Send + Sync {
    /// Today's date.
    fn today(&self) -> NaiveDate;

    /// The current calendar year.
    fn current_year(&self) -> i32 {
        self.today().year()
    }
}

/// Clock backed by the system time in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Clock pinned to a single date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(NaiveDate);

impl FixedClock {
    /// Create a clock that always reports `today`.
    #[must_use]
    pub const fn new(today: NaiveDate) -> Self {
        Self(today)
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

// =============================================================================
// Trading Date
// =============================================================================

/// A validated weekday date for which a movers list may be published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TradingDate {
    year: i32,
    month: u32,
    day: u32,
}

impl TradingDate {
    /// Validate a (year, month, day) triple.
    ///
    /// # Errors
    ///
    /// - [`DateError::Invalid`] if the triple is not a real calendar date.
    /// - [`DateError::YearOutOfRange`] if the year is before
    ///   [`FIRST_ARCHIVED_YEAR`] or after the clock's current year.
    /// - [`DateError::WeekendUnavailable`] if the date falls on a weekend.
    pub fn validate(
        year: i32,
        month: u32,
        day: u32,
        clock: &dyn Clock,
    ) -> Result<Self, DateError> {
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or(DateError::Invalid { year, month, day })?;

        let current_year = clock.current_year();
        if !(FIRST_ARCHIVED_YEAR..=current_year).contains(&year) {
            return Err(DateError::YearOutOfRange {
                year,
                min: FIRST_ARCHIVED_YEAR,
                max: current_year,
            });
        }

        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            return Err(DateError::WeekendUnavailable {
                date: date.to_string(),
            });
        }

        Ok(Self { year, month, day })
    }

    /// Re-run validation against `clock`.
    pub fn revalidate(&self, clock: &dyn Clock) -> Result<Self, DateError> {
        Self::validate(self.year, self.month, self.day, clock)
    }

    /// Four-digit year.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Month of year, 1-12.
    #[must_use]
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// Day of month, 1-31.
    #[must_use]
    pub const fn day(&self) -> u32 {
        self.day
    }
}

impl fmt::Display for TradingDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Reasons a requested date cannot have a movers list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateError {
    /// Not a real calendar date.
    #[error("invalid date: {year}-{month}-{day}")]
    Invalid {
        /// Requested year.
        year: i32,
        /// Requested month.
        month: u32,
        /// Requested day.
        day: u32,
    },

    /// Year is outside the archived range.
    #[error("invalid year {year}: must be between {min} and {max}")]
    YearOutOfRange {
        /// Requested year.
        year: i32,
        /// First archived year.
        min: i32,
        /// Current year.
        max: i32,
    },

    /// Markets are closed on weekends.
    #[error("movers data is not available on weekends ({date})")]
    WeekendUnavailable {
        /// The weekend date that was requested.
        date: String,
    },
}

impl DateError {
    /// Whether this is a weekend rejection rather than a malformed date.
    #[must_use]
    pub const fn is_weekend(&self) -> bool {
        matches!(self, Self::WeekendUnavailable { .. })
    }
}

// =============================================================================
// Tests
// =============================================================================
