//! HTTP document fetcher.
//!
//! One pooled `reqwest::Client`, one attempt per call, a bounded total
//! timeout covering connect and transfer, and nothing but 200 accepted.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::application::ports::{DocumentFetcher, FetchError};

/// Default total timeout for a fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Fetcher settings.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Total request timeout (connect + transfer).
    pub timeout: Duration,
    /// User-Agent header sent with each request.
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_FETCH_TIMEOUT,
            user_agent: format!("market-movers/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// [`DocumentFetcher`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpDocumentFetcher {
    client: Client,
}

impl HttpDocumentFetcher {
    /// Create a fetcher from config.
    pub fn new(config: &FetcherConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| FetchError::Network {
                locator: String::new(),
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl DocumentFetcher for HttpDocumentFetcher {
    async fn fetch(&self, locator: &str) -> Result<String, FetchError> {
        let network = |e: reqwest::Error| {
            let message = if e.is_timeout() {
                format!("request timeout: {e}")
            } else if e.is_connect() {
                format!("connection failed: {e}")
            } else {
                format!("request failed: {e}")
            };
            FetchError::Network {
                locator: locator.to_string(),
                message,
            }
        };

        let response = self.client.get(locator).send().await.map_err(network)?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(locator, status = status.as_u16(), "Unexpected status from source");
            return Err(FetchError::BadStatus {
                locator: locator.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(network)?;
        tracing::debug!(locator, bytes = body.len(), "Fetched source document");
        Ok(body)
    }
}
