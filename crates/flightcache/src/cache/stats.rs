//! Cache statistics and metrics tracking
//!
//! Counters are plain atomics shared between cache clones, so recording never
//! takes the index lock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Point-in-time statistics for cache performance monitoring
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Current number of entries, including computations still in flight
    pub size: usize,

    /// Maximum allowed entries
    pub capacity: usize,

    /// Lookups answered from an existing entry
    pub hits: u64,

    /// Lookups that found no usable entry
    pub misses: u64,

    /// Computations that completed successfully
    pub computations: u64,

    /// Computations that returned an error
    pub failures: u64,

    /// Values installed directly with `set`
    pub inserts: u64,

    /// Entries evicted to make room
    pub evictions: u64,

    /// Expired entries removed (lazily or by cleanup)
    pub expirations: u64,
}

impl CacheStats {
    /// Calculate hit rate (hits / total accesses)
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_accesses();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Calculate miss rate (misses / total accesses)
    pub fn miss_rate(&self) -> f64 {
        if self.total_accesses() == 0 {
            0.0
        } else {
            1.0 - self.hit_rate()
        }
    }

    /// Calculate fill ratio (size / capacity)
    pub fn fill_ratio(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            self.size as f64 / self.capacity as f64
        }
    }

    /// Total number of lookups (hits + misses)
    pub const fn total_accesses(&self) -> u64 {
        self.hits + self.misses
    }
}

/// Thread-safe metrics collector for cache operations
#[derive(Debug, Clone)]
pub(crate) struct MetricsCollector {
    enabled: bool,
    counters: Arc<Counters>,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    computations: AtomicU64,
    failures: AtomicU64,
    inserts: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
}

impl MetricsCollector {
    /// Create a collector; a disabled one ignores every record call
    pub(crate) fn new(enabled: bool) -> Self {
        Self { enabled, counters: Arc::new(Counters::default()) }
    }

    fn bump(&self, counter: &AtomicU64, by: u64) {
        if self.enabled && by > 0 {
            counter.fetch_add(by, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_hit(&self) {
        self.bump(&self.counters.hits, 1);
    }

    pub(crate) fn record_miss(&self) {
        self.bump(&self.counters.misses, 1);
    }

    pub(crate) fn record_computation(&self) {
        self.bump(&self.counters.computations, 1);
    }

    pub(crate) fn record_failure(&self) {
        self.bump(&self.counters.failures, 1);
    }

    pub(crate) fn record_insert(&self) {
        self.bump(&self.counters.inserts, 1);
    }

    pub(crate) fn record_eviction(&self) {
        self.bump(&self.counters.evictions, 1);
    }

    pub(crate) fn record_expirations(&self, count: usize) {
        self.bump(&self.counters.expirations, count as u64);
    }

    /// Get current statistics snapshot
    pub(crate) fn snapshot(&self, size: usize, capacity: usize) -> CacheStats {
        let c = &self.counters;
        CacheStats {
            size,
            capacity,
            hits: c.hits.load(Ordering::Relaxed),
            misses: c.misses.load(Ordering::Relaxed),
            computations: c.computations.load(Ordering::Relaxed),
            failures: c.failures.load(Ordering::Relaxed),
            inserts: c.inserts.load(Ordering::Relaxed),
            evictions: c.evictions.load(Ordering::Relaxed),
            expirations: c.expirations.load(Ordering::Relaxed),
        }
    }

    /// Reset all metrics to zero
    pub(crate) fn reset(&self) {
        let c = &self.counters;
        for counter in [
            &c.hits,
            &c.misses,
            &c.computations,
            &c.failures,
            &c.inserts,
            &c.evictions,
            &c.expirations,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for cache::stats.
    use super::*;

    /// Validates `Default::default` behavior for the hit rate calculation
    /// scenario.
    ///
    /// Assertions:
    /// - Ensures `(stats.hit_rate() - 0.8).abs() < 1e-10` evaluates to true.
    /// - Ensures `(stats.miss_rate() - 0.2).abs() < 1e-10` evaluates to true.
    /// - Confirms `stats.total_accesses()` equals `100`.
    #[test]
    fn test_hit_rate_calculation() {
        let stats = CacheStats { hits: 80, misses: 20, ..Default::default() };

        assert!((stats.hit_rate() - 0.8).abs() < 1e-10);
        assert!((stats.miss_rate() - 0.2).abs() < 1e-10);
        assert_eq!(stats.total_accesses(), 100);
    }

    /// Validates `CacheStats::default` behavior for the no accesses scenario.
    ///
    /// Assertions:
    /// - Confirms `stats.hit_rate()` and `stats.miss_rate()` equal `0.0`.
    /// - Confirms `stats.fill_ratio()` equals `0.0` for zero capacity.
    #[test]
    fn test_rates_without_accesses() {
        let stats = CacheStats::default();
        assert_eq!(stats.hit_rate(), 0.0);
        assert_eq!(stats.miss_rate(), 0.0);
        assert_eq!(stats.fill_ratio(), 0.0);
    }

    /// Validates `CacheStats::fill_ratio`.
    ///
    /// Assertions:
    /// - Ensures `(stats.fill_ratio() - 0.25).abs() < 1e-10` evaluates to true.
    #[test]
    fn test_fill_ratio() {
        let stats = CacheStats { size: 25, capacity: 100, ..Default::default() };
        assert!((stats.fill_ratio() - 0.25).abs() < 1e-10);
    }

    /// Validates `MetricsCollector` recording, sharing and reset.
    ///
    /// Assertions:
    /// - Confirms a clone records into the same counters.
    /// - Confirms `reset` zeroes every counter.
    #[test]
    fn test_collector_records_and_resets() {
        let metrics = MetricsCollector::new(true);
        let clone = metrics.clone();

        metrics.record_hit();
        clone.record_hit();
        metrics.record_miss();
        metrics.record_computation();
        metrics.record_failure();
        metrics.record_insert();
        metrics.record_eviction();
        metrics.record_expirations(3);

        let stats = metrics.snapshot(4, 10);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.computations, 1);
        assert_eq!(stats.failures, 1);
        assert_eq!(stats.inserts, 1);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.expirations, 3);
        assert_eq!(stats.size, 4);
        assert_eq!(stats.capacity, 10);

        clone.reset();
        assert_eq!(metrics.snapshot(0, 10), CacheStats { capacity: 10, ..Default::default() });
    }

    /// Validates that a disabled collector records nothing.
    ///
    /// Assertions:
    /// - Confirms `stats.hits` equals `0`.
    #[test]
    fn test_disabled_collector_is_inert() {
        let metrics = MetricsCollector::new(false);
        metrics.record_hit();
        metrics.record_expirations(5);
        let stats = metrics.snapshot(0, 1);
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.expirations, 0);
    }
}
