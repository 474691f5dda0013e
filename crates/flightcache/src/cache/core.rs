//! Core cache implementation with single-flight computation
//!
//! This module provides a generic, thread-safe LRU cache with optional
//! per-entry TTL. Lookups that miss run the caller's computation exactly once
//! per key, with every concurrent caller for that key waiting on the same
//! result.
//!
//! # Locking
//!
//! One readers-writer lock guards the [`Index`] (key map plus recency list).
//! It is never held while a computation runs or while a caller waits for an
//! entry to become ready, so a slow key never blocks unrelated keys.

use std::convert::Infallible;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::{debug, instrument, trace, warn};

use super::config::{CacheConfig, DEFAULT_CAPACITY};
use super::entry::{Entry, Outcome, Publisher};
use super::index::Index;
use super::stats::{CacheStats, MetricsCollector};
use crate::clock::{Clock, SystemClock};
use crate::error::{CacheError, CacheResult};

/// Result of trying to claim a missing key under the write lock
enum Admission<V, E> {
    /// Another caller got there first; wait on its entry
    Existing(Arc<Entry<V, E>>),
    /// This caller owns the computation for the new entry
    Reserved(Arc<Entry<V, E>>),
}

/// Generic thread-safe cache with LRU eviction, TTL and single-flight
/// computation
///
/// # Type Parameters
/// - `K`: Key type (must be `Eq + Hash + Clone`)
/// - `V`: Value type (must be `Clone`; each caller receives its own copy)
/// - `E`: Error type of the caller's computations
/// - `C`: Clock type for time-based operations (defaults to `SystemClock`)
///
/// # Example
/// ```
/// use std::time::Duration;
///
/// use flightcache::Cache;
///
/// let cache: Cache<String, u64, std::io::Error> = Cache::new(100);
///
/// let value = cache.get_with(&"answer".to_string(), || Ok(42))?;
/// assert_eq!(value, 42);
///
/// cache.set("ephemeral".to_string(), 7, Duration::from_secs(60));
/// assert_eq!(cache.get(&"ephemeral".to_string())?, 7);
/// # Ok::<(), flightcache::CacheError<std::io::Error>>(())
/// ```
pub struct Cache<K, V, E = Infallible, C = SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    index: Arc<RwLock<Index<K, V, E>>>,
    config: CacheConfig,
    metrics: MetricsCollector,
    clock: C,
}

impl<K, V, E> Cache<K, V, E, SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a cache holding at most `capacity` entries
    ///
    /// A capacity of zero is replaced by [`DEFAULT_CAPACITY`].
    pub fn new(capacity: usize) -> Self {
        Self::with_config(CacheConfig::lru(capacity))
    }

    /// Create a new cache with the given configuration using system clock
    pub fn with_config(config: CacheConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<K, V, E, C> Cache<K, V, E, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    /// Create a new cache with a custom clock (useful for testing)
    pub fn with_clock(config: CacheConfig, clock: C) -> Self {
        if config.capacity == 0 {
            debug!(default = DEFAULT_CAPACITY, "zero cache capacity replaced by default");
        }
        let config = config.normalized();
        Self {
            index: Arc::new(RwLock::new(Index::new(config.capacity))),
            metrics: MetricsCollector::new(config.track_metrics),
            config,
            clock,
        }
    }

    /// Look up a value without supplying a computation
    ///
    /// Fails with [`CacheError::NotFound`] if the key is absent or expired.
    /// If the key's value is still being computed by another caller, this
    /// waits for that computation and shares its outcome.
    pub fn get(&self, key: &K) -> CacheResult<V, E> {
        self.resolve(key, None, None::<fn() -> Result<V, E>>)
    }

    /// Look up a value, computing it on a miss
    ///
    /// Concurrent callers for the same missing key share a single invocation
    /// of `compute`. A failed computation is returned to every waiter and is
    /// not cached. Computed values expire after the configured default TTL,
    /// if any.
    pub fn get_with<F>(&self, key: &K, compute: F) -> CacheResult<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        self.resolve(key, self.config.default_ttl, Some(compute))
    }

    /// Like [`get_with`](Self::get_with), with a TTL for this computation
    ///
    /// `Duration::ZERO` means the computed value never expires.
    pub fn get_with_ttl<F>(&self, key: &K, ttl: Duration, compute: F) -> CacheResult<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        self.resolve(key, Some(ttl).filter(|ttl| !ttl.is_zero()), Some(compute))
    }

    /// Install a value without computing it
    ///
    /// Replaces any existing entry for `key`. Callers already waiting on the
    /// replaced entry still receive that entry's outcome; an in-flight
    /// computation is not cancelled. `Duration::ZERO` means never expires.
    pub fn set(&self, key: K, value: V, ttl: Duration) {
        let expires_at = self.deadline(Some(ttl).filter(|ttl| !ttl.is_zero()));
        let entry = Arc::new(Entry::ready(value, expires_at));

        let evicted = self.index.write().insert(key, entry);
        if evicted.is_some() {
            self.metrics.record_eviction();
            trace!("evicted least recently used entry");
        }
        self.metrics.record_insert();
    }

    /// Remove a value from the cache; returns whether an entry was removed
    pub fn delete(&self, key: &K) -> bool {
        self.index.write().remove(key)
    }

    /// Clear all entries from the cache
    pub fn clear(&self) {
        self.index.write().clear();
        self.metrics.reset();
    }

    /// Get the current number of entries
    ///
    /// Includes entries whose computation is still in flight.
    pub fn size(&self) -> usize {
        self.index.read().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.index.read().capacity()
    }

    /// Whether an entry (ready or still computing) exists for `key`
    ///
    /// Does not check expiration and does not affect recency.
    pub fn contains_key(&self, key: &K) -> bool {
        self.index.read().contains(key)
    }

    /// Whether a computation for `key` is currently in flight
    pub fn in_flight(&self, key: &K) -> bool {
        self.index.read().get(key).is_some_and(|entry| !entry.is_ready())
    }

    /// Snapshot of keys from most to least recently used
    pub fn recency_order(&self) -> Vec<K> {
        self.index.read().keys()
    }

    /// Remove expired entries
    ///
    /// Every entry is judged against one timestamp taken at the start of the
    /// scan. Entries without a TTL, entries still computing, and entries not
    /// yet expired are left in place with their recency unchanged. Returns the
    /// number of entries removed.
    #[instrument(skip(self))]
    pub fn cleanup(&self) -> usize {
        let now = self.clock.now();
        let removed = self.index.write().remove_expired(now);
        if removed > 0 {
            self.metrics.record_expirations(removed);
            debug!(removed, "removed expired cache entries");
        }
        removed
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let index = self.index.read();
        self.metrics.snapshot(index.len(), index.capacity())
    }

    /// The normalized configuration this cache runs with
    pub const fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn deadline(&self, ttl: Option<Duration>) -> Option<Instant> {
        ttl.and_then(|ttl| self.clock.now().checked_add(ttl))
    }

    fn resolve<F>(&self, key: &K, ttl: Option<Duration>, mut compute: Option<F>) -> CacheResult<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        loop {
            let cached = self.index.read().get(key);
            let entry = match cached {
                Some(entry) => entry,
                None => {
                    let Some(pending) = compute.take() else {
                        self.metrics.record_miss();
                        return Err(CacheError::NotFound);
                    };
                    match self.admit(key) {
                        Admission::Existing(entry) => {
                            compute = Some(pending);
                            entry
                        }
                        Admission::Reserved(entry) => {
                            self.metrics.record_miss();
                            return self.fill(key, entry, ttl, pending);
                        }
                    }
                }
            };

            match entry.wait() {
                Outcome::Ready { value, expires_at } => {
                    if expires_at.is_some_and(|at| self.clock.now() > at) {
                        self.expire(key, &entry);
                        continue;
                    }
                    self.index.write().promote(key, &entry);
                    self.metrics.record_hit();
                    return Ok(value);
                }
                Outcome::Failed(err) => return Err(CacheError::Compute(err)),
                Outcome::Abandoned => return Err(CacheError::Abandoned),
            }
        }
    }

    /// Double-checked insertion: re-check under the write lock, then reserve
    fn admit(&self, key: &K) -> Admission<V, E> {
        let mut index = self.index.write();
        if let Some(entry) = index.get(key) {
            return Admission::Existing(entry);
        }

        let entry = Arc::new(Entry::reserved());
        if index.insert(key.clone(), Arc::clone(&entry)).is_some() {
            self.metrics.record_eviction();
            trace!("evicted least recently used entry");
        }
        Admission::Reserved(entry)
    }

    /// Run the computation outside the lock and publish its outcome
    fn fill<F>(
        &self,
        key: &K,
        entry: Arc<Entry<V, E>>,
        ttl: Option<Duration>,
        compute: F,
    ) -> CacheResult<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let mut reservation =
            Reservation { index: &self.index, key, publisher: Publisher::new(entry) };

        match compute() {
            Ok(value) => {
                let expires_at = self.deadline(ttl);
                reservation.publisher.publish(Outcome::Ready { value: value.clone(), expires_at });
                self.metrics.record_computation();
                Ok(value)
            }
            Err(err) => {
                let err = Arc::new(err);
                // Withdraw before signaling so no later lookup sees the failure.
                self.index.write().remove_if_same(key, reservation.publisher.entry());
                reservation.publisher.publish(Outcome::Failed(Arc::clone(&err)));
                self.metrics.record_failure();
                debug!("computation failed; entry withdrawn");
                Err(CacheError::Compute(err))
            }
        }
    }

    /// Drop a stale entry unless someone already replaced it
    fn expire(&self, key: &K, stale: &Arc<Entry<V, E>>) {
        if self.index.write().remove_if_same(key, stale) {
            self.metrics.record_expirations(1);
            trace!("expired entry removed on access");
        }
    }
}

/// Ownership of an in-flight computation
///
/// If the computation unwinds, dropping the reservation withdraws the entry
/// from the index before its publisher releases the waiters.
struct Reservation<'a, K, V, E>
where
    K: Eq + Hash + Clone,
{
    index: &'a RwLock<Index<K, V, E>>,
    key: &'a K,
    publisher: Publisher<V, E>,
}

impl<K, V, E> Drop for Reservation<'_, K, V, E>
where
    K: Eq + Hash + Clone,
{
    fn drop(&mut self) {
        if !self.publisher.is_published() {
            self.index.write().remove_if_same(self.key, self.publisher.entry());
            warn!("computation abandoned before publishing; entry withdrawn");
        }
    }
}

impl<K, V, E, C> Clone for Cache<K, V, E, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock + Clone,
{
    fn clone(&self) -> Self {
        Self {
            index: Arc::clone(&self.index),
            config: self.config.clone(),
            metrics: self.metrics.clone(),
            clock: self.clock.clone(),
        }
    }
}

impl<K, V, E, C> fmt::Debug for Cache<K, V, E, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("size", &self.size())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
