//! Movers table parser.
//!
//! Extracts [`Stock`] records from the movers page. The page carries one
//! `table.mdcTable`; its first row is a header and every following row is
//! one listing with six cells:
//!
//! | # | Role                      | Example            |
//! |---|---------------------------|--------------------|
//! | 0 | rank (unused)             | `1`                |
//! | 1 | `<name> (<ticker>)`       | `Acme Corp (ACME)` |
//! | 2 | price                     | `$12.34`           |
//! | 3 | net change (unused)       | `0.66`             |
//! | 4 | percent change            | `+5.67%`           |
//! | 5 | volume                    | `1,234`            |
//!
//! Any bad row fails the whole document; there is no partial output.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};

use crate::domain::movers::Stock;

/// CSS selector identifying the movers table.
pub const TABLE_SELECTOR: &str = "table.mdcTable";

/// Cells every data row must have.
pub const EXPECTED_COLUMNS: usize = 6;

const NAME_COLUMN: usize = 1;
const PRICE_COLUMN: usize = 2;
const PERCENT_CHANGE_COLUMN: usize = 4;
const VOLUME_COLUMN: usize = 5;

#[allow(clippy::expect_used)]
static TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(TABLE_SELECTOR).expect("static table selector is valid"));

#[allow(clippy::expect_used)]
static ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tbody tr").expect("static row selector is valid"));

#[allow(clippy::expect_used)]
static CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("static cell selector is valid"));

#[allow(clippy::expect_used)]
static NAME_AND_TICKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.+)\s\((.+)\)").expect("static name/ticker pattern is valid"));

/// Parse the movers page into listings, in document order.
pub fn parse_movers_table(document: &str) -> Result<Vec<Stock>, ParseError> {
    let html = Html::parse_document(document);
    let table = html
        .select(&TABLE)
        .next()
        .ok_or(ParseError::MalformedDocument)?;

    table
        .select(&ROW)
        .skip(1)
        .enumerate()
        .map(|(index, row)| parse_row(index + 1, row))
        .collect()
}

fn parse_row(row: usize, tr: ElementRef<'_>) -> Result<Stock, ParseError> {
    let cells: Vec<String> = tr.select(&CELL).map(|td| td.text().collect()).collect();

    if cells.len() != EXPECTED_COLUMNS {
        return Err(ParseError::ColumnCountMismatch {
            row,
            expected: EXPECTED_COLUMNS,
            found: cells.len(),
        });
    }

    let (name, ticker) = split_name_and_ticker(&cells[NAME_COLUMN]).ok_or_else(|| {
        ParseError::NameTickerFormat {
            row,
            value: cells[NAME_COLUMN].clone(),
        }
    })?;

    let price: Decimal = parse_numeric(row, "price", &cells[PRICE_COLUMN])?;
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ParseError::NumericParse {
            row,
            column: "price",
            value: cells[PRICE_COLUMN].clone(),
        });
    }

    Ok(Stock {
        ticker,
        name,
        price,
        percent_change: parse_numeric(row, "percent_change", &cells[PERCENT_CHANGE_COLUMN])?,
        volume: parse_numeric(row, "volume", &cells[VOLUME_COLUMN])?,
    })
}

/// Split `"Acme Corp (ACME)"` into `("Acme Corp", "ACME")`.
fn split_name_and_ticker(cell: &str) -> Option<(String, String)> {
    let collapsed = cell.split_whitespace().collect::<Vec<_>>().join(" ");
    let captures = NAME_AND_TICKER.captures(&collapsed)?;
    let name = captures.get(1)?.as_str().trim();
    let ticker = captures.get(2)?.as_str().trim();
    Some((name.to_string(), ticker.to_string()))
}

/// Keep only ASCII digits, `-` and `.`.
///
/// Strips currency symbols, thousands separators, percent signs, plus
/// signs and whitespace.
#[must_use]
pub fn normalize_numeric(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '-' | '.'))
        .collect()
}

fn parse_numeric<T: FromStr>(
    row: usize,
    column: &'static str,
    raw: &str,
) -> Result<T, ParseError> {
    normalize_numeric(raw)
        .parse()
        .map_err(|_| ParseError::NumericParse {
            row,
            column,
            value: raw.to_string(),
        })
}

// =============================================================================
// Errors
// =============================================================================

/// Movers document parse error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The movers table is missing.
    #[error("malformed document: no table.mdcTable element")]
    MalformedDocument,

    /// A data row had the wrong number of cells.
    #[error("row {row}: expected {expected} columns, got {found}")]
    ColumnCountMismatch {
        /// 1-based data row number.
        row: usize,
        /// Required cell count.
        expected: usize,
        /// Cells present.
        found: usize,
    },

    /// The name cell is not `<name> (<ticker>)`.
    #[error("row {row}: expected \"name (ticker)\", got {value:?}")]
    NameTickerFormat {
        /// 1-based data row number.
        row: usize,
        /// Raw cell text.
        value: String,
    },

    /// A numeric cell did not parse.
    #[error("row {row}: invalid {column} value {value:?}")]
    NumericParse {
        /// 1-based data row number.
        row: usize,
        /// Column role.
        column: &'static str,
        /// Raw cell text.
        value: String,
    },
}
