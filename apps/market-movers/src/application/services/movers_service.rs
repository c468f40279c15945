//! Movers Service
//!
//! Fetch-or-return-cached entry point for movers lists. On a cache miss
//! the producer locates the page, fetches it once and parses it; on a hit
//! no I/O happens.

use std::sync::Arc;
use std::time::Instant;

use crate::application::ports::{DocumentFetcher, FetchError};
use crate::domain::calendar::{DateError, TradingDate};
use crate::domain::movers::{CacheKey, MoverList, Stock};
use crate::infrastructure::cache::FetchCache;
use crate::infrastructure::metrics;
use crate::infrastructure::source::{ParseError, SourceLocator, parse_movers_table};

/// A completed movers list, shared between all callers.
pub type MoversResult = Arc<[Stock]>;

/// Cache of completed movers lists.
pub type MoversCache = FetchCache<CacheKey, MoversResult>;

/// Movers service orchestrating locate, fetch, parse and cache.
pub struct MoversService<F>
where
    F: DocumentFetcher,
{
    locator: Arc<SourceLocator>,
    fetcher: Arc<F>,
    cache: Arc<MoversCache>,
}

impl<F> MoversService<F>
where
    F: DocumentFetcher + 'static,
{
    /// Create a service with a fresh, empty cache.
    #[must_use]
    pub fn new(locator: SourceLocator, fetcher: Arc<F>) -> Self {
        Self::with_cache(locator, fetcher, Arc::new(MoversCache::new()))
    }

    /// Create a service over an existing cache.
    #[must_use]
    pub fn with_cache(locator: SourceLocator, fetcher: Arc<F>, cache: Arc<MoversCache>) -> Self {
        Self {
            locator: Arc::new(locator),
            fetcher,
            cache,
        }
    }

    /// Validate a requested date against the service clock.
    pub fn trading_date(
        &self,
        year: i32,
        month: u32,
        day: u32,
    ) -> Result<TradingDate, MoversError> {
        Ok(TradingDate::validate(year, month, day, self.locator.clock())?)
    }

    /// Movers for `list` on `date`, fetched at most once per process.
    ///
    /// The lookup runs on its own task so an in-flight fetch completes and
    /// populates the cache even if this caller goes away.
    #[tracing::instrument(skip(self), fields(key = %CacheKey::new(list, date)))]
    pub async fn movers(
        &self,
        list: MoverList,
        date: TradingDate,
    ) -> Result<MoversResult, MoversError> {
        let key = CacheKey::new(list, date);
        metrics::record_request(list);

        if let Some(stocks) = self.cache.get(&key) {
            return Ok(stocks);
        }

        let locator = Arc::clone(&self.locator);
        let fetcher = Arc::clone(&self.fetcher);
        let cache = Arc::clone(&self.cache);

        let lookup = tokio::spawn(async move {
            let result = cache
                .get_or_fetch(&key, || fetch_movers(&locator, fetcher.as_ref(), key))
                .await;
            metrics::set_cached_results(cache.completed_len());
            result
        });

        lookup
            .await
            .map_err(|e| MoversError::Task(e.to_string()))?
    }

    /// Number of completed lists held in the cache.
    #[must_use]
    pub fn cached_results(&self) -> usize {
        self.cache.completed_len()
    }
}

/// Cache-miss producer: locate, fetch once, parse.
async fn fetch_movers<F>(
    locator: &SourceLocator,
    fetcher: &F,
    key: CacheKey,
) -> Result<MoversResult, MoversError>
where
    F: DocumentFetcher + ?Sized,
{
    let url = locator.locate(key.list, &key.date)?;
    metrics::record_cache_miss(key.list);
    tracing::info!(%key, locator = %url, "Cache miss, fetching movers");

    let started = Instant::now();
    let document = match fetcher.fetch(&url).await {
        Ok(document) => document,
        Err(e) => {
            metrics::record_fetch(key.list, e.kind(), started.elapsed());
            tracing::warn!(%key, error = %e, "Movers fetch failed");
            return Err(e.into());
        }
    };

    let stocks = match parse_movers_table(&document) {
        Ok(stocks) => stocks,
        Err(e) => {
            metrics::record_fetch(key.list, "parse", started.elapsed());
            tracing::warn!(%key, error = %e, "Movers document rejected");
            return Err(e.into());
        }
    };

    metrics::record_fetch(key.list, "ok", started.elapsed());
    tracing::info!(
        %key,
        rows = stocks.len(),
        elapsed_ms = started.elapsed().as_millis(),
        "Movers cached"
    );

    Ok(stocks.into())
}

// =============================================================================
// Errors
// =============================================================================

/// Errors surfaced by [`MoversService`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoversError {
    /// The requested date cannot have a movers list.
    #[error(transparent)]
    Date(#[from] DateError),

    /// The source could not be retrieved.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The source document could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The lookup task panicked or was aborted.
    #[error("movers lookup task failed: {0}")]
    Task(String),
}

impl MoversError {
    /// Whether the caller's input was at fault rather than a dependency.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Date(_))
    }

    /// Stable machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Date(DateError::WeekendUnavailable { .. }) => "WEEKEND_UNAVAILABLE",
            Self::Date(_) => "INVALID_DATE",
            Self::Fetch(FetchError::Network { .. }) => "NETWORK_ERROR",
            Self::Fetch(FetchError::BadStatus { .. }) => "BAD_STATUS",
            Self::Parse(ParseError::MalformedDocument) => "MALFORMED_DOCUMENT",
            Self::Parse(ParseError::ColumnCountMismatch { .. }) => "COLUMN_COUNT_MISMATCH",
            Self::Parse(ParseError::NameTickerFormat { .. }) => "NAME_TICKER_FORMAT",
            Self::Parse(ParseError::NumericParse { .. }) => "NUMERIC_PARSE_ERROR",
            Self::Task(_) => "INTERNAL",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use mockall::mock;

    use super::*;
    use crate::domain::calendar::{Clock, FixedClock};
    use crate::infrastructure::source::SourceTemplates;

    mock! {
        Fetcher {}

        #[async_trait]
        impl DocumentFetcher for Fetcher {
            async fn fetch(&self, locator: &str) -> Result<String, FetchError>;
        }
    }

    const PAGE: &str = "<table class=\"mdcTable\"><tbody>\
        <tr><td></td><td>Issue</td><td>Price</td><td>Chg</td><td>% Chg</td><td>Volume</td></tr>\
        <tr><td>1</td><td>Acme Corp (ACME)</td><td>$12.34</td><td>0.66</td><td>+5.67%</td><td>1,234</td></tr>\
        </tbody></table>";

    const EMPTY_PAGE: &str = "<table class=\"mdcTable\"><tbody>\
        <tr><td></td><td>Issue</td><td>Price</td><td>Chg</td><td>% Chg</td><td>Volume</td></tr>\
        </tbody></table>";

    fn clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()))
    }

    fn service(fetcher: MockFetcher) -> MoversService<MockFetcher> {
        let locator = SourceLocator::new(SourceTemplates::default(), clock());
        MoversService::new(locator, Arc::new(fetcher))
    }

    fn network_error() -> FetchError {
        FetchError::Network {
            locator: "http://www.wsj.com/".to_string(),
            message: "connection reset".to_string(),
        }
    }

    #[tokio::test]
    async fn miss_fetches_parses_and_caches() {
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|url| url.contains("gaincomp-gainer-20210315"))
            .times(1)
            .returning(|_| Ok(PAGE.to_string()));

        let service = service(fetcher);
        let date = service.trading_date(2021, 3, 15).unwrap();

        let first = service.movers(MoverList::Gainers, date).await.unwrap();
        let second = service.movers(MoverList::Gainers, date).await.unwrap();

        assert_eq!(first.len(), 1);
        assert_eq!(first[0].ticker, "ACME");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(service.cached_results(), 1);
    }

    /// Fetcher that takes `delay` to answer and counts its calls.
    struct SlowFetcher {
        delay: std::time::Duration,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DocumentFetcher for SlowFetcher {
        async fn fetch(&self, _locator: &str) -> Result<String, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(PAGE.to_string())
        }
    }

    #[tokio::test]
    async fn dropped_caller_does_not_abandon_fetch() {
        let fetcher = Arc::new(SlowFetcher {
            delay: std::time::Duration::from_millis(200),
            calls: AtomicUsize::new(0),
        });
        let locator = SourceLocator::new(SourceTemplates::default(), clock());
        let service = MoversService::new(locator, Arc::clone(&fetcher));
        let date = service.trading_date(2021, 3, 15).unwrap();

        let abandoned = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            service.movers(MoverList::Gainers, date),
        )
        .await;
        assert!(abandoned.is_err());
        assert_eq!(service.cached_results(), 0);

        tokio::time::sleep(std::time::Duration::from_millis(400)).await;
        assert_eq!(service.cached_results(), 1);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);

        let stocks = service.movers(MoverList::Gainers, date).await.unwrap();
        assert_eq!(stocks[0].ticker, "ACME");
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn lists_are_cached_separately() {
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch()
            .times(2)
            .returning(|_| Ok(PAGE.to_string()));

        let service = service(fetcher);
        let date = service.trading_date(2021, 3, 15).unwrap();

        service.movers(MoverList::Gainers, date).await.unwrap();
        service.movers(MoverList::Losers, date).await.unwrap();
        service.movers(MoverList::Losers, date).await.unwrap();

        assert_eq!(service.cached_results(), 2);
    }

    #[tokio::test]
    async fn empty_list_is_cached() {
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch()
            .times(1)
            .returning(|_| Ok(EMPTY_PAGE.to_string()));

        let service = service(fetcher);
        let date = service.trading_date(2021, 3, 15).unwrap();

        for _ in 0..2 {
            let stocks = service.movers(MoverList::Losers, date).await.unwrap();
            assert!(stocks.is_empty());
        }
        assert_eq!(service.cached_results(), 1);
    }

    #[tokio::test]
    async fn failed_fetch_is_retried_on_next_request() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);

        let mut fetcher = MockFetcher::new();
        fetcher.expect_fetch().times(2).returning(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(network_error())
            } else {
                Ok(PAGE.to_string())
            }
        });

        let service = service(fetcher);
        let date = service.trading_date(2021, 3, 15).unwrap();

        let err = service.movers(MoverList::Gainers, date).await.unwrap_err();
        assert_eq!(err.code(), "NETWORK_ERROR");
        assert!(!err.is_client_error());
        assert_eq!(service.cached_results(), 0);

        let stocks = service.movers(MoverList::Gainers, date).await.unwrap();
        assert_eq!(stocks.len(), 1);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn bad_status_propagates_unchanged() {
        let mut fetcher = MockFetcher::new();
        fetcher.expect_fetch().times(1).returning(|url| {
            Err(FetchError::BadStatus {
                locator: url.to_string(),
                status: 404,
            })
        });

        let service = service(fetcher);
        let date = service.trading_date(2021, 3, 15).unwrap();

        let err = service.movers(MoverList::Gainers, date).await.unwrap_err();
        assert!(matches!(
            err,
            MoversError::Fetch(FetchError::BadStatus { status: 404, .. })
        ));
        assert_eq!(err.code(), "BAD_STATUS");
    }

    #[tokio::test]
    async fn parse_failure_is_not_cached() {
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch()
            .times(2)
            .returning(|_| Ok("<html><body>Page not found</body></html>".to_string()));

        let service = service(fetcher);
        let date = service.trading_date(2021, 3, 15).unwrap();

        for _ in 0..2 {
            let err = service.movers(MoverList::Gainers, date).await.unwrap_err();
            assert_eq!(err, MoversError::Parse(ParseError::MalformedDocument));
            assert_eq!(err.code(), "MALFORMED_DOCUMENT");
        }
    }

    #[tokio::test]
    async fn date_rejected_by_locator_never_fetches() {
        let mut fetcher = MockFetcher::new();
        fetcher.expect_fetch().times(0);

        // Validated under a 2024 clock; the service believes it is 2020.
        let date = TradingDate::validate(2021, 3, 15, clock().as_ref()).unwrap();
        let old_clock: Arc<dyn Clock> =
            Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()));
        let service = MoversService::new(
            SourceLocator::new(SourceTemplates::default(), old_clock),
            Arc::new(fetcher),
        );

        let err = service.movers(MoverList::Gainers, date).await.unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(err.code(), "INVALID_DATE");
    }

    #[test]
    fn trading_date_classifies_errors() {
        let service = service(MockFetcher::new());

        let weekend = service.trading_date(2021, 3, 13).unwrap_err();
        assert!(weekend.is_client_error());
        assert_eq!(weekend.code(), "WEEKEND_UNAVAILABLE");

        let invalid = service.trading_date(2021, 2, 30).unwrap_err();
        assert!(invalid.is_client_error());
        assert_eq!(invalid.code(), "INVALID_DATE");
    }
}
