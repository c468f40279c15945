//! Movers Domain Types
//!
//! The two published movers lists and the records they contain.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::calendar::TradingDate;

// =============================================================================
// Mover List
// =============================================================================

/// A published list of securities with significant price movements.
///
/// Both lists span the NYSE, NASDAQ and Arca composite and include common
/// stock, closed-end funds, ETFs, ETNs and REITs with a prior close of at
/// least $2 and volume of at least 2,000 shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoverList {
    /// Largest percentage gainers.
    Gainers,
    /// Largest percentage decliners.
    Losers,
}

impl MoverList {
    /// Get all lists.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Gainers, Self::Losers]
    }

    /// Lowercase list name, used in routes, logs and metric labels.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Gainers => "gainers",
            Self::Losers => "losers",
        }
    }
}

impl fmt::Display for MoverList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Stock
// =============================================================================

/// An equity listing that appeared on a movers list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    /// Ticker symbol (e.g., "ACME").
    pub ticker: String,
    /// Instrument name (e.g., "Acme Corp").
    #[serde(rename = "instrument")]
    pub name: String,
    /// Last price.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Percent change on the day, signed.
    #[serde(rename = "percentChange", with = "rust_decimal::serde::float")]
    pub percent_change: Decimal,
    /// Shares traded.
    pub volume: u64,
}

// =============================================================================
// Cache Key
// =============================================================================

/// Identity of one cached movers result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    /// Which list.
    pub list: MoverList,
    /// Which trading day.
    pub date: TradingDate,
}

impl CacheKey {
    /// Create a key for `list` on `date`.
    #[must_use]
    pub const fn new(list: MoverList, date: TradingDate) -> Self {
        Self { list, date }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.list, self.date)
    }
}
