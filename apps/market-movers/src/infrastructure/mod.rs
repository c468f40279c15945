//! Infrastructure Layer - Adapters and external integrations.
//!
//! Concrete implementations of the application ports plus the process
//! plumbing around them.

/// Single-flight, write-once cache of fetched results.
pub mod cache;

/// Configuration from environment variables.
pub mod config;

/// Movers REST API, health and metrics endpoints.
pub mod http;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// Locator, HTTP fetcher and table parser for the movers source.
pub mod source;

/// Tracing subscriber and OpenTelemetry integration.
pub mod telemetry;
