//! HTTP Controller (Driver Adapter)
//!
//! Axum-based REST API that delegates to [`MoversService`].
//!
//! # Endpoints
//!
//! - `GET /gainers/{date}` - Largest percentage gainers for a trading day
//! - `GET /losers/{date}` - Largest percentage losers for a trading day
//! - `GET /health` - JSON health status
//! - `GET /healthz` - Liveness check (simple OK)
//! - `GET /metrics` - Prometheus metrics in text format
//!
//! `{date}` is `YYYY-M-D` with optional zero padding and a 20xx year.
//! Anything else is a 404, the same as an unknown route.

use std::sync::{Arc, LazyLock};
use std::time::{Duration, Instant};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use regex::Regex;
use tower_http::timeout::TimeoutLayer;

use super::response::{ApiError, HealthResponse};
use crate::application::ports::DocumentFetcher;
use crate::application::services::MoversService;
use crate::domain::movers::MoverList;
use crate::infrastructure::metrics::get_metrics_handle;

/// Default upper bound on handling one request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[allow(clippy::expect_used)]
static DATE_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(20\d{2})-([01]?\d)-([0-3]?\d)$").expect("date segment pattern is valid")
});

/// Application state shared across handlers.
pub struct AppState<F>
where
    F: DocumentFetcher,
{
    /// Movers lookups.
    pub movers: Arc<MoversService<F>>,
    /// Application version.
    pub version: String,
    /// When the router was built.
    pub started_at: Instant,
    /// Requests still running after this are answered with 408.
    pub request_timeout: Duration,
}

impl<F> AppState<F>
where
    F: DocumentFetcher,
{
    /// Create state for `movers`, starting the uptime clock now.
    #[must_use]
    pub fn new(movers: Arc<MoversService<F>>, version: impl Into<String>) -> Self {
        Self {
            movers,
            version: version.into(),
            started_at: Instant::now(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Override the per-request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl<F> Clone for AppState<F>
where
    F: DocumentFetcher,
{
    fn clone(&self) -> Self {
        Self {
            movers: Arc::clone(&self.movers),
            version: self.version.clone(),
            started_at: self.started_at,
            request_timeout: self.request_timeout,
        }
    }
}

/// Create the HTTP router with all endpoints.
///
/// Every route is bounded by the state's request timeout. A movers lookup
/// cut off this way keeps running and still fills the cache.
#[allow(deprecated)]
pub fn create_router<F>(state: AppState<F>) -> Router
where
    F: DocumentFetcher + 'static,
{
    let timeout = TimeoutLayer::new(state.request_timeout);
    Router::new()
        .route("/gainers/{date}", get(gainers::<F>))
        .route("/losers/{date}", get(losers::<F>))
        .route("/health", get(health_check::<F>))
        .route("/healthz", get(liveness))
        .route("/metrics", get(metrics_handler))
        .layer(timeout)
        .with_state(state)
}

async fn gainers<F>(State(state): State<AppState<F>>, Path(date): Path<String>) -> Response
where
    F: DocumentFetcher + 'static,
{
    movers_handler(&state, MoverList::Gainers, &date).await
}

async fn losers<F>(State(state): State<AppState<F>>, Path(date): Path<String>) -> Response
where
    F: DocumentFetcher + 'static,
{
    movers_handler(&state, MoverList::Losers, &date).await
}

async fn movers_handler<F>(state: &AppState<F>, list: MoverList, segment: &str) -> Response
where
    F: DocumentFetcher + 'static,
{
    let Some((year, month, day)) = parse_date_segment(segment) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let result = match state.movers.trading_date(year, month, day) {
        Ok(date) => state.movers.movers(list, date).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(stocks) => Json(stocks.to_vec()).into_response(),
        Err(e) => {
            let err = ApiError::from(e);
            tracing::debug!(
                %list,
                date = segment,
                status = err.status().as_u16(),
                code = err.0.code(),
                "Movers request failed"
            );
            err.into_response()
        }
    }
}

/// Split a `{date}` path segment into numeric parts.
fn parse_date_segment(segment: &str) -> Option<(i32, u32, u32)> {
    let caps = DATE_SEGMENT.captures(segment)?;
    Some((
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
    ))
}

async fn health_check<F>(State(state): State<AppState<F>>) -> impl IntoResponse
where
    F: DocumentFetcher + 'static,
{
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        cached_results: state.movers.cached_results(),
    })
}

async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn metrics_handler() -> impl IntoResponse {
    get_metrics_handle().map_or_else(
        || {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                [("content-type", "text/plain")],
                "Metrics not initialized".to_string(),
            )
        },
        |handle| {
            (
                StatusCode::OK,
                [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
                handle.render(),
            )
        },
    )
}
