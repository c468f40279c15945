//! HTTP response DTOs.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::application::services::MoversError;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "healthy" while the process serves requests.
    pub status: String,
    /// Service version.
    pub version: String,
    /// Seconds since the router was built.
    pub uptime_secs: u64,
    /// Completed movers lists held in memory.
    pub cached_results: usize,
}

/// Error body returned for every failed movers request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Stable error code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

/// A [`MoversError`] rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub MoversError);

impl ApiError {
    /// Status code for the wrapped error.
    ///
    /// Bad input is 400, an upstream or parse failure is 424 and a lost
    /// lookup task is 500.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            MoversError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::FAILED_DEPENDENCY,
        }
    }
}

impl From<MoversError> for ApiError {
    fn from(err: MoversError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorResponse {
            code: self.0.code().to_string(),
            message: self.0.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
