//! Document Fetcher Port (Driven Port)
//!
//! Interface for retrieving the raw movers document behind a locator.

use async_trait::async_trait;

/// Retrieves raw documents from the movers source.
///
/// Each call is a single, independent attempt. Implementations may pool
/// connections but must not retry.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetch the document at `locator`.
    async fn fetch(&self, locator: &str) -> Result<String, FetchError>;
}

/// Outbound retrieval error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Connect, timeout or body read failure.
    #[error("network error fetching {locator}: {message}")]
    Network {
        /// The locator being fetched.
        locator: String,
        /// Error details.
        message: String,
    },

    /// The source answered with anything other than 200.
    #[error("status code error fetching {locator}: {status}")]
    BadStatus {
        /// The locator being fetched.
        locator: String,
        /// HTTP status code received.
        status: u16,
    },
}

impl FetchError {
    /// Metric label for this error.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Network { .. } => "network",
            Self::BadStatus { .. } => "bad_status",
        }
    }
}
