//! Memoizer that holds one lock across every call

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{MemoFn, Memoize};
use crate::error::{CacheError, CacheResult};

/// Memoizer guarded by a single mutex held while the function runs
///
/// Simple and correct, but a slow call for one key blocks callers of every
/// other key until it returns.
pub struct LockedMemo<K, V, E> {
    func: MemoFn<K, V, E>,
    results: Mutex<HashMap<K, Result<V, Arc<E>>>>,
}

impl<K, V, E> LockedMemo<K, V, E>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Memoize `func`
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&K) -> Result<V, E> + Send + Sync + 'static,
    {
        Self { func: Arc::new(func), results: Mutex::new(HashMap::new()) }
    }

    /// Number of memoized keys
    pub fn len(&self) -> usize {
        self.results.lock().len()
    }

    /// Whether nothing has been memoized yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V, E> Memoize<K, V, E> for LockedMemo<K, V, E>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn get(&self, key: &K) -> CacheResult<V, E> {
        let mut results = self.results.lock();
        let result = match results.get(key) {
            Some(result) => result.clone(),
            None => {
                let result = (self.func)(key).map_err(Arc::new);
                results.insert(key.clone(), result.clone());
                result
            }
        };
        result.map_err(CacheError::Compute)
    }
}

impl<K, V, E> fmt::Debug for LockedMemo<K, V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockedMemo").field("keys", &self.results.lock().len()).finish()
    }
}
