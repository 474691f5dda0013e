//! Periodic expiration sweeps on a background thread

use std::hash::Hash;
use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, select, tick, Sender};
use tracing::{debug, info};

use super::core::Cache;
use crate::clock::Clock;

/// Background thread that calls [`Cache::cleanup`] on a fixed interval
///
/// The worker stops when [`stop`](Self::stop) is called or when it is
/// dropped; either way the thread is joined before returning.
///
/// # Example
/// ```
/// use std::time::Duration;
///
/// use flightcache::cache::{Cache, CleanupWorker};
///
/// let cache: Cache<String, u32> = Cache::new(64);
/// let worker = CleanupWorker::spawn(cache.clone(), Duration::from_millis(50))?;
/// cache.set("k".to_string(), 1, Duration::from_millis(10));
/// worker.stop();
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct CleanupWorker {
    shutdown: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl CleanupWorker {
    /// Start sweeping `cache` every `interval`
    ///
    /// Fails only if the operating system refuses to spawn the thread.
    pub fn spawn<K, V, E, C>(cache: Cache<K, V, E, C>, interval: Duration) -> io::Result<Self>
    where
        K: Eq + Hash + Clone + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
        E: Send + Sync + 'static,
        C: Clock + Clone,
    {
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
        let ticker = tick(interval);

        let handle = thread::Builder::new().name("flightcache-cleanup".into()).spawn(move || {
            info!(interval_ms = interval.as_millis() as u64, "cache cleanup worker started");
            loop {
                select! {
                    recv(ticker) -> _ => {
                        let removed = cache.cleanup();
                        if removed > 0 {
                            debug!(removed, "periodic cleanup pass");
                        }
                    }
                    recv(shutdown_rx) -> _ => break,
                }
            }
            info!("cache cleanup worker stopped");
        })?;

        Ok(Self { shutdown: Some(shutdown_tx), handle: Some(handle) })
    }

    /// Signal the worker to exit and wait for it
    pub fn stop(mut self) {
        self.shutdown_and_join();
    }

    fn shutdown_and_join(&mut self) {
        // Dropping the sender disconnects the channel and wakes the worker.
        self.shutdown.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                debug!("cache cleanup worker panicked");
            }
        }
    }
}

impl Drop for CleanupWorker {
    fn drop(&mut self) {
        self.shutdown_and_join();
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for cache::maintenance.
    use std::time::Instant;

    use super::*;
    use crate::cache::CacheConfig;
    use crate::clock::MockClock;

    /// Validates `CleanupWorker::spawn` behavior for the periodic sweep
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms expired entries disappear without any caller touching them.
    /// - Confirms entries without a TTL are kept.
    #[test]
    fn test_worker_removes_expired_entries() {
        let clock = MockClock::new();
        let cache: Cache<&'static str, i32, (), MockClock> =
            Cache::with_clock(CacheConfig::lru(10), clock.clone());
        cache.set("short", 1, Duration::from_millis(5));
        cache.set("forever", 2, Duration::ZERO);
        clock.advance_millis(10);

        let worker = CleanupWorker::spawn(cache.clone(), Duration::from_millis(5))
            .expect("spawn cleanup worker");

        let deadline = Instant::now() + Duration::from_secs(2);
        while cache.contains_key(&"short") && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        worker.stop();

        assert!(!cache.contains_key(&"short"));
        assert!(cache.contains_key(&"forever"));
    }

    /// Validates that dropping the worker joins its thread.
    ///
    /// Assertions:
    /// - Ensures drop returns promptly even with a long interval.
    #[test]
    fn test_drop_stops_worker() {
        let cache: Cache<u32, u32> = Cache::new(4);
        let worker =
            CleanupWorker::spawn(cache, Duration::from_secs(3600)).expect("spawn cleanup worker");

        let started = Instant::now();
        drop(worker);
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
