//! Application Layer - Use cases and port definitions.
//!
//! This layer contains the movers service and the port interfaces
//! that define how it reaches the outside world.

/// Port interfaces for external systems.
pub mod ports;

/// Application services.
pub mod services;
