//! Domain Layer - Core movers types and date rules.
//!
//! This layer contains the trading-date validation rules and the movers
//! data model with no I/O. All types here are pure Rust with
//! serialization support.

/// Trading date validation and the injectable clock.
pub mod calendar;

/// Mover lists, stock records and cache keys.
pub mod movers;
