//! Movers Source Adapters
//!
//! Everything that touches the published movers pages:
//! - `locator`: (list, date) to page URL
//! - `fetcher`: HTTP retrieval implementing `DocumentFetcher`
//! - `parser`: movers table extraction

pub mod fetcher;
pub mod locator;
pub mod parser;

pub use fetcher::{DEFAULT_FETCH_TIMEOUT, FetcherConfig, HttpDocumentFetcher};
pub use locator::{SourceLocator, SourceTemplates};
pub use parser::{ParseError, parse_movers_table};
