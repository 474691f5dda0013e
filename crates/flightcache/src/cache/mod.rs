//! Bounded cache with LRU eviction, TTL expiration and single-flight
//! computation
//!
//! # Features
//!
//! - **Thread-safe**: one `RwLock` guards the index, never held while a value
//!   is computed
//! - **Single-flight**: concurrent misses on one key share a single
//!   computation
//! - **LRU eviction**: the least recently used entry makes room at capacity
//! - **TTL support**: per-entry expiration, lazily on access or via
//!   [`Cache::cleanup`]
//! - **Metrics tracking**: optional hit/miss/eviction statistics
//! - **Testable**: clock abstraction for deterministic time-based testing
//!
//! # Examples
//!
//! ## Compute on miss
//! ```
//! use flightcache::cache::Cache;
//!
//! let cache: Cache<String, usize, std::num::ParseIntError> = Cache::new(100);
//!
//! let value = cache.get_with(&"42".to_string(), || "42".parse::<usize>())?;
//! assert_eq!(value, 42);
//! # Ok::<(), flightcache::CacheError<std::num::ParseIntError>>(())
//! ```
//!
//! ## Combined TTL + LRU
//! ```
//! use std::time::Duration;
//!
//! use flightcache::cache::{Cache, CacheConfig};
//!
//! let cache: Cache<String, Vec<u8>> =
//!     Cache::with_config(CacheConfig::ttl_lru(Duration::from_secs(300), 1000));
//! cache.set("blob".to_string(), vec![1, 2, 3], Duration::ZERO);
//! assert_eq!(cache.size(), 1);
//! ```
//!
//! ## Cache Statistics
//! ```
//! use std::time::Duration;
//!
//! use flightcache::cache::{Cache, CacheConfig};
//!
//! let config = CacheConfig::builder().capacity(100).track_metrics(true).build();
//! let cache: Cache<String, i32> = Cache::with_config(config);
//!
//! cache.set("key".to_string(), 42, Duration::ZERO);
//! let _ = cache.get(&"key".to_string()); // Hit
//! let _ = cache.get(&"missing".to_string()); // Miss
//!
//! let stats = cache.stats();
//! assert_eq!(stats.hits, 1);
//! assert_eq!(stats.misses, 1);
//! assert_eq!(stats.hit_rate(), 0.5);
//! ```

mod config;
mod core;
pub(crate) mod entry;
mod index;
mod maintenance;
mod stats;

pub use config::{CacheConfig, CacheConfigBuilder, DEFAULT_CAPACITY};
pub use self::core::Cache;
pub use maintenance::CleanupWorker;
pub use stats::CacheStats;
