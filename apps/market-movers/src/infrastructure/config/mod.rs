//! Configuration Module
//!
//! Environment-driven configuration for the movers service.

mod settings;

pub use settings::{ConfigError, ServerSettings, ServiceConfig};
