//! Function memoizers sharing one lookup trait
//!
//! Each memoizer wraps a function `Fn(&K) -> Result<V, E>` and caches its
//! results per key. They differ in how concurrent callers are coordinated:
//!
//! | Memo | Coordination | Bounded | Failures cached |
//! |------|--------------|---------|-----------------|
//! | [`LockedMemo`] | one mutex held across the call | no | yes |
//! | [`FlightMemo`] | mutex-guarded map, call outside the lock | no | yes |
//! | [`MonitorMemo`] | coordinator thread fed by a channel | no | yes |
//! | [`CachedMemo`] | [`Cache`](crate::cache::Cache) | yes | no |
//!
//! `LockedMemo` serializes every key behind one slow call; the others only
//! make callers of the *same* key wait for each other.
//!
//! # Example
//! ```
//! use flightcache::memo::{FlightMemo, Memoize};
//!
//! let memo = FlightMemo::new(|n: &u64| Ok::<_, std::convert::Infallible>(n * n));
//! assert_eq!(memo.get(&12)?, 144);
//! # Ok::<(), flightcache::CacheError<std::convert::Infallible>>(())
//! ```

use std::sync::Arc;

use crate::error::CacheResult;

mod cached;
mod flight;
mod locked;
mod monitor;

pub use cached::CachedMemo;
pub use flight::FlightMemo;
pub use locked::LockedMemo;
pub use monitor::MonitorMemo;

/// Shared handle to the memoized function
pub(crate) type MemoFn<K, V, E> = Arc<dyn Fn(&K) -> Result<V, E> + Send + Sync>;

/// A memoized function lookup
pub trait Memoize<K, V, E> {
    /// Return the memoized result for `key`, calling the function if needed
    fn get(&self, key: &K) -> CacheResult<V, E>;
}
