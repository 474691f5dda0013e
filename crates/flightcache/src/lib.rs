//! In-memory memoization cache with single-flight computation.
//!
//! [`Cache`] memoizes a possibly expensive, possibly failing computation per
//! key while enforcing three properties at once:
//!
//! - a bounded store with least-recently-used eviction,
//! - optional per-entry time-to-live expiration,
//! - single-flight computation: concurrent misses on one key run the
//!   computation once and every caller receives the same result.
//!
//! The [`memo`] module holds simpler function memoizers with the same lookup
//! trait, useful as baselines.
//!
//! # Example
//! ```
//! use std::time::Duration;
//!
//! use flightcache::{Cache, CacheConfig};
//!
//! let cache: Cache<u64, String, std::fmt::Error> =
//!     Cache::with_config(CacheConfig::ttl_lru(Duration::from_secs(30), 256));
//!
//! let rendered = cache.get_with(&7, || Ok(format!("page {}", 7)))?;
//! assert_eq!(rendered, "page 7");
//! # Ok::<(), flightcache::CacheError<std::fmt::Error>>(())
//! ```
//!
//! # Features
//!
//! - `serde`: `Serialize`/`Deserialize` for [`CacheConfig`] and TOML loading

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod cache;
pub mod clock;
pub mod collections;
pub mod error;
pub mod memo;

// Re-export commonly used types and traits for convenience
// ------------------------
pub use cache::{Cache, CacheConfig, CacheConfigBuilder, CacheStats, CleanupWorker};
pub use clock::{Clock, MockClock, SystemClock};
#[cfg(feature = "serde")]
pub use error::ConfigError;
pub use error::{CacheError, CacheResult, ErrorClassification, ErrorSeverity};
pub use memo::{CachedMemo, FlightMemo, LockedMemo, Memoize, MonitorMemo};
