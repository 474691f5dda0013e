//! Memoizer backed by the bounded single-flight [`Cache`]

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use super::{MemoFn, Memoize};
use crate::cache::{Cache, CacheConfig};
use crate::clock::{Clock, SystemClock};
use crate::error::CacheResult;

/// [`Cache`] driven by a fixed function
///
/// Unlike the other memoizers it is bounded, honours the configured TTL and
/// does not keep failures: a failed key is retried on the next lookup.
///
/// # Example
/// ```
/// use flightcache::cache::CacheConfig;
/// use flightcache::memo::{CachedMemo, Memoize};
///
/// let memo = CachedMemo::new(CacheConfig::lru(2), |s: &String| s.parse::<i64>());
/// assert_eq!(memo.get(&"17".to_string())?, 17);
/// assert!(memo.get(&"x".to_string()).is_err());
/// assert_eq!(memo.cache().size(), 1);
/// # Ok::<(), flightcache::CacheError<std::num::ParseIntError>>(())
/// ```
pub struct CachedMemo<K, V, E, C = SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    cache: Cache<K, V, E, C>,
    func: MemoFn<K, V, E>,
}

impl<K, V, E> CachedMemo<K, V, E>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Memoize `func` in a new cache built from `config`
    pub fn new<F>(config: CacheConfig, func: F) -> Self
    where
        F: Fn(&K) -> Result<V, E> + Send + Sync + 'static,
    {
        Self::with_cache(Cache::with_config(config), func)
    }
}

impl<K, V, E, C> CachedMemo<K, V, E, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    /// Memoize `func` into an existing cache (which may be shared)
    pub fn with_cache<F>(cache: Cache<K, V, E, C>, func: F) -> Self
    where
        F: Fn(&K) -> Result<V, E> + Send + Sync + 'static,
    {
        Self { cache, func: Arc::new(func) }
    }

    /// The underlying cache
    pub const fn cache(&self) -> &Cache<K, V, E, C> {
        &self.cache
    }
}

impl<K, V, E, C> Memoize<K, V, E> for CachedMemo<K, V, E, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    fn get(&self, key: &K) -> CacheResult<V, E> {
        self.cache.get_with(key, || (self.func)(key))
    }
}

impl<K, V, E, C> fmt::Debug for CachedMemo<K, V, E, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedMemo").field("cache", &self.cache).finish_non_exhaustive()
    }
}
