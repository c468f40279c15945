//! HTTP/REST API adapter.
//!
//! Inbound adapter exposing movers lists, health and metrics.

mod controller;
mod response;
mod server;

pub use controller::{AppState, DEFAULT_REQUEST_TIMEOUT, create_router};
pub use response::{ApiError, ApiErrorResponse, HealthResponse};
pub use server::{HttpServer, HttpServerError};
