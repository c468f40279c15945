//! Application Services
//!
//! - `MoversService`: Cached, single-flight access to movers lists

mod movers_service;

pub use movers_service::{MoversCache, MoversError, MoversResult, MoversService};
