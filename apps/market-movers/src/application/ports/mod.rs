//! Port Interfaces
//!
//! Defines the interfaces (ports) for external systems following
//! the Hexagonal Architecture pattern.
//!
//! ## Driven Ports (Outbound)
//!
//! - `DocumentFetcher`: Retrieval of the raw movers document

mod document_fetcher_port;

pub use document_fetcher_port::{DocumentFetcher, FetchError};
