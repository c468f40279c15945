#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Market Movers - Daily Gainers and Losers Service
//!
//! Serves the largest percentage gainers and losers for a past trading
//! day. Lists are scraped from a published archive page on first request
//! and cached in memory for the life of the process; concurrent requests
//! for the same list and date share a single fetch.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Date rules and data types
//!   - `calendar`: Trading-date validation against an injectable clock
//!   - `movers`: Mover lists, stock records, cache keys
//!
//! - **Application**: Use cases and port definitions
//!   - `ports`: `DocumentFetcher` for raw page retrieval
//!   - `services`: `MoversService` (locate, fetch, parse, cache)
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `source`: URL locator, HTTP fetcher, HTML table parser
//!   - `cache`: Single-flight write-once cache
//!   - `http`: Axum REST API, health and metrics endpoints
//!   - `config`, `metrics`, `telemetry`: Process plumbing
//!
//! # Data Flow
//!
//! ```text
//! GET /gainers/2021-03-15
//!   → TradingDate::validate
//!   → FetchCache (hit → return)
//!       miss → SourceLocator → HttpDocumentFetcher → parse_movers_table
//!   → JSON array of Stock
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Date rules and movers types with no I/O.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::calendar::{Clock, DateError, FixedClock, SystemClock, TradingDate};
pub use domain::movers::{CacheKey, MoverList, Stock};

// Ports and services
pub use application::ports::{DocumentFetcher, FetchError};
pub use application::services::{MoversCache, MoversError, MoversResult, MoversService};

// Source adapters
pub use infrastructure::source::{
    FetcherConfig, HttpDocumentFetcher, ParseError, SourceLocator, SourceTemplates,
    parse_movers_table,
};

// HTTP
pub use infrastructure::http::{
    ApiErrorResponse, AppState, HealthResponse, HttpServer, HttpServerError, create_router,
};

// Infrastructure config
pub use infrastructure::config::{ConfigError, ServerSettings, ServiceConfig};

// Metrics
pub use infrastructure::metrics::init_metrics;

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
