//! Single-Flight Fetch Cache
//!
//! Write-once, in-memory cache that coalesces concurrent requests for the
//! same key into a single producer run.
//!
//! # Locking
//!
//! Two levels:
//! - A structural `parking_lot::Mutex` over the key map, held only for the
//!   get-or-create step and never across an `.await`.
//! - One [`SingleFlight`] cell per key. Its initializer runs under a
//!   one-permit semaphore so every other caller for that key waits for the
//!   outcome; reading a completed cell takes no lock at all.
//!
//! Callers of distinct keys only ever contend on the structural lock.
//!
//! Entries are never evicted. A failed producer leaves its entry empty,
//! so the next caller for the key runs the producer again.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::OnceCell;

// =============================================================================
// Single Flight
// =============================================================================

/// A write-once slot whose initialization runs at most once at a time.
///
/// Completion means the cell holds a value, not anything about the value's
/// contents, so a legitimately empty result is still a completed one.
#[derive(Debug)]
pub struct SingleFlight<V> {
    cell: OnceCell<V>,
}

impl<V> Default for SingleFlight<V> {
    fn default() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }
}

impl<V: Clone> SingleFlight<V> {
    /// Return the stored value, or run `producer` to create it.
    ///
    /// Concurrent callers queue on the cell. When the holder succeeds they
    /// observe its value; when it fails the next in line runs its own
    /// producer.
    pub async fn get_or_try_init<F, Fut, E>(&self, producer: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        self.cell.get_or_try_init(producer).await.cloned()
    }

    /// The stored value, if completed. Never waits.
    #[must_use]
    pub fn peek(&self) -> Option<V> {
        self.cell.get().cloned()
    }

    /// Whether a value has been stored.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.cell.initialized()
    }
}

// =============================================================================
// Fetch Cache
// =============================================================================

/// Key-addressed map of [`SingleFlight`] slots.
#[derive(Debug)]
pub struct FetchCache<K, V> {
    entries: Mutex<HashMap<K, Arc<SingleFlight<V>>>>,
}

impl<K, V> Default for FetchCache<K, V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> FetchCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, or run `producer` to fetch it.
    ///
    /// At most one producer runs per key at a time. Success is stored
    /// forever; failure is returned to this caller only and not stored.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &K, producer: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let entry = self.entry(key);
        entry.get_or_try_init(producer).await
    }

    /// Completed value for `key` without waiting or fetching.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<V> {
        let entry = self.entries.lock().get(key).map(Arc::clone)?;
        entry.peek()
    }

    /// Number of keys with a completed value.
    #[must_use]
    pub fn completed_len(&self) -> usize {
        self.entries
            .lock()
            .values()
            .filter(|e| e.is_completed())
            .count()
    }

    /// Atomic get-or-create of the slot for `key`.
    fn entry(&self, key: &K) -> Arc<SingleFlight<V>> {
        let mut entries = self.entries.lock();
        Arc::clone(entries.entry(key.clone()).or_default())
    }
}

// =============================================================================
// Tests
// =============================================================================
