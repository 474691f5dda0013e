//! Memoizer with per-key single-flight and a lock-free call

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;

use super::{MemoFn, Memoize};
use crate::cache::entry::{Entry, Outcome, Publisher};
use crate::error::CacheResult;

type Entries<K, V, E> = Mutex<HashMap<K, Arc<Entry<V, E>>>>;

/// Memoizer that releases its lock before calling the function
///
/// The first caller for a key installs a pending entry and computes; later
/// callers for that key wait on the entry instead of calling again. Callers
/// of other keys are never blocked by a computation in progress.
pub struct FlightMemo<K, V, E> {
    func: MemoFn<K, V, E>,
    entries: Entries<K, V, E>,
}

impl<K, V, E> FlightMemo<K, V, E>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Memoize `func`
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&K) -> Result<V, E> + Send + Sync + 'static,
    {
        Self { func: Arc::new(func), entries: Mutex::new(HashMap::new()) }
    }

    /// Number of memoized (or in-flight) keys
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing has been memoized yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V, E> Memoize<K, V, E> for FlightMemo<K, V, E>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn get(&self, key: &K) -> CacheResult<V, E> {
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get(key).cloned() {
            drop(entries);
            return entry.wait().into_result();
        }

        let entry = Arc::new(Entry::reserved());
        entries.insert(key.clone(), Arc::clone(&entry));
        drop(entries);

        let mut claim = Claim { entries: &self.entries, key, publisher: Publisher::new(entry) };
        let outcome = Outcome::settled((self.func)(key));
        claim.publisher.publish(outcome.clone());
        outcome.into_result()
    }
}

/// Withdraws the pending entry if the function unwinds
struct Claim<'a, K, V, E>
where
    K: Eq + Hash,
{
    entries: &'a Entries<K, V, E>,
    key: &'a K,
    publisher: Publisher<V, E>,
}

impl<K, V, E> Drop for Claim<'_, K, V, E>
where
    K: Eq + Hash,
{
    fn drop(&mut self) {
        if self.publisher.is_published() {
            return;
        }
        let mut entries = self.entries.lock();
        if entries.get(self.key).is_some_and(|entry| Arc::ptr_eq(entry, self.publisher.entry())) {
            entries.remove(self.key);
        }
        warn!("memoized function panicked; pending entry withdrawn");
    }
}

impl<K, V, E> fmt::Debug for FlightMemo<K, V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlightMemo").field("keys", &self.entries.lock().len()).finish()
    }
}
