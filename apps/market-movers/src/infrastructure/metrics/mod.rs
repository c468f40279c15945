//! Prometheus Metrics Module
//!
//! Exposes service metrics in Prometheus format.
//!
//! # Metrics Categories
//!
//! - **Requests**: Movers lookups by list, and how many missed the cache
//! - **Fetches**: Outbound fetch outcomes and latency
//! - **Cache**: Completed results held in memory
//!
//! # Integration
//!
//! Metrics are exposed at `/metrics` on the HTTP port.

use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

use crate::domain::movers::MoverList;

const REQUESTS_TOTAL: &str = "market_movers_requests_total";
const CACHE_MISSES_TOTAL: &str = "market_movers_cache_misses_total";
const FETCHES_TOTAL: &str = "market_movers_fetches_total";
const FETCH_DURATION_SECONDS: &str = "market_movers_fetch_duration_seconds";
const CACHED_RESULTS: &str = "market_movers_cached_results";

// =============================================================================
// Global Metrics Handle
// =============================================================================

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder, once per process.
///
/// Later calls return the handle installed by the first.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    register_metrics();
    Ok(PROMETHEUS_HANDLE.get_or_init(|| handle).clone())
}

/// Get the Prometheus handle for rendering metrics.
///
/// Returns `None` if metrics have not been initialized.
#[must_use]
pub fn get_metrics_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

// =============================================================================
// Metric Registration
// =============================================================================

fn register_metrics() {
    describe_counter!(REQUESTS_TOTAL, "Movers lookups by list");
    describe_counter!(
        CACHE_MISSES_TOTAL,
        "Movers lookups that had to fetch from the source"
    );
    describe_counter!(FETCHES_TOTAL, "Outbound fetches by list and result");
    describe_histogram!(
        FETCH_DURATION_SECONDS,
        "Time to fetch and parse a movers document"
    );
    describe_gauge!(CACHED_RESULTS, "Completed movers lists held in memory");
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Record a movers lookup.
pub fn record_request(list: MoverList) {
    counter!(REQUESTS_TOTAL, "list" => list.as_str()).increment(1);
}

/// Record a lookup that missed the cache.
pub fn record_cache_miss(list: MoverList) {
    counter!(CACHE_MISSES_TOTAL, "list" => list.as_str()).increment(1);
}

/// Record an outbound fetch and its outcome (`ok`, `network`, `bad_status`, `parse`).
pub fn record_fetch(list: MoverList, result: &'static str, elapsed: Duration) {
    counter!(FETCHES_TOTAL, "list" => list.as_str(), "result" => result).increment(1);
    histogram!(FETCH_DURATION_SECONDS, "list" => list.as_str()).record(elapsed.as_secs_f64());
}

/// Update the completed-results gauge.
#[allow(clippy::cast_precision_loss)]
pub fn set_cached_results(count: usize) {
    gauge!(CACHED_RESULTS).set(count as f64);
}
