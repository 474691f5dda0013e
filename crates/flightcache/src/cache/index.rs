//! Key index and recency order, guarded together by the cache's lock
//!
//! The key map and the recency list always hold exactly the same entries:
//! every structural change goes through one of the methods below, each of
//! which updates both sides.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Instant;

use super::entry::Entry;
use crate::collections::{Handle, RecencyList};

/// Recency list payload; carries its own key so the tail can be evicted
/// without scanning the map
#[derive(Debug)]
struct Slot<K, V, E> {
    key: K,
    entry: Arc<Entry<V, E>>,
}

/// Mapping from key to entry plus the most-to-least recently used order
#[derive(Debug)]
pub(crate) struct Index<K, V, E> {
    slots: HashMap<K, Handle>,
    order: RecencyList<Slot<K, V, E>>,
    capacity: usize,
}

impl<K, V, E> Index<K, V, E>
where
    K: Eq + Hash + Clone,
{
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            slots: HashMap::with_capacity(capacity),
            order: RecencyList::with_capacity(capacity),
            capacity,
        }
    }

    pub(crate) fn len(&self) -> usize {
        debug_assert_eq!(self.slots.len(), self.order.len());
        self.slots.len()
    }

    pub(crate) const fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn contains(&self, key: &K) -> bool {
        self.slots.contains_key(key)
    }

    /// The entry currently indexed under `key`
    pub(crate) fn get(&self, key: &K) -> Option<Arc<Entry<V, E>>> {
        let handle = *self.slots.get(key)?;
        self.order.get(handle).map(|slot| Arc::clone(&slot.entry))
    }

    /// Indexes `entry` under `key` at the most recently used position.
    ///
    /// An existing entry for `key` is replaced. When the index is full the
    /// least recently used entry is evicted first, so the size never exceeds
    /// the capacity. Returns the evicted key.
    pub(crate) fn insert(&mut self, key: K, entry: Arc<Entry<V, E>>) -> Option<K> {
        self.remove(&key);

        let evicted = if self.slots.len() >= self.capacity { self.evict_tail() } else { None };

        let handle = self.order.push_front(Slot { key: key.clone(), entry });
        self.slots.insert(key, handle);
        evicted
    }

    /// Removes the least recently used entry and returns its key.
    pub(crate) fn evict_tail(&mut self) -> Option<K> {
        let slot = self.order.pop_back()?;
        self.slots.remove(&slot.key);
        Some(slot.key)
    }

    /// Removes whatever entry is indexed under `key`.
    pub(crate) fn remove(&mut self, key: &K) -> bool {
        match self.slots.remove(key) {
            Some(handle) => self.order.remove(handle).is_some(),
            None => false,
        }
    }

    /// Removes the entry under `key` only if it is still `expected`.
    ///
    /// Keeps a caller holding a stale entry from deleting a fresh one that
    /// another caller installed in the meantime.
    pub(crate) fn remove_if_same(&mut self, key: &K, expected: &Arc<Entry<V, E>>) -> bool {
        if !self.holds(key, expected) {
            return false;
        }
        self.remove(key)
    }

    /// Promotes the entry under `key` to most recently used if it is still
    /// `expected`.
    pub(crate) fn promote(&mut self, key: &K, expected: &Arc<Entry<V, E>>) -> bool {
        let Some(&handle) = self.slots.get(key) else {
            return false;
        };
        if !self.holds(key, expected) {
            return false;
        }
        self.order.move_to_front(handle);
        true
    }

    /// Removes every entry that is expired at `now`; returns how many.
    ///
    /// Entries that stay keep their relative order.
    pub(crate) fn remove_expired(&mut self, now: Instant) -> usize {
        let expired: Vec<Handle> = self
            .order
            .handles()
            .filter(|(_, slot)| slot.entry.is_expired(now))
            .map(|(handle, _)| handle)
            .collect();

        for handle in &expired {
            if let Some(slot) = self.order.remove(*handle) {
                self.slots.remove(&slot.key);
            }
        }
        expired.len()
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.order.clear();
    }

    /// Keys from most to least recently used
    pub(crate) fn keys(&self) -> Vec<K> {
        self.order.iter().map(|slot| slot.key.clone()).collect()
    }

    fn holds(&self, key: &K, expected: &Arc<Entry<V, E>>) -> bool {
        self.slots
            .get(key)
            .and_then(|&handle| self.order.get(handle))
            .is_some_and(|slot| Arc::ptr_eq(&slot.entry, expected))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for cache::index.
    use std::time::Duration;

    use super::*;

    type TestIndex = Index<&'static str, i32, ()>;

    fn ready(value: i32) -> Arc<Entry<i32, ()>> {
        Arc::new(Entry::ready(value, None))
    }

    fn expiring(value: i32, at: Instant) -> Arc<Entry<i32, ()>> {
        Arc::new(Entry::ready(value, Some(at)))
    }

    /// Validates `Index::insert` behavior at capacity.
    ///
    /// Assertions:
    /// - Confirms the least recently used key is returned as evicted.
    /// - Confirms `index.len()` never exceeds the capacity.
    #[test]
    fn test_insert_evicts_tail_before_inserting() {
        let mut index = TestIndex::new(2);
        assert_eq!(index.insert("a", ready(1)), None);
        assert_eq!(index.insert("b", ready(2)), None);
        assert_eq!(index.insert("c", ready(3)), Some("a"));
        assert_eq!(index.len(), 2);
        assert_eq!(index.keys(), vec!["c", "b"]);
    }

    /// Validates `Index::insert` replacing an existing key.
    ///
    /// Assertions:
    /// - Confirms replacing a key in a full index evicts nothing.
    /// - Confirms the replaced key moves to the front.
    #[test]
    fn test_insert_replaces_existing_key() {
        let mut index = TestIndex::new(2);
        index.insert("a", ready(1));
        index.insert("b", ready(2));

        assert_eq!(index.insert("a", ready(10)), None);
        assert_eq!(index.len(), 2);
        assert_eq!(index.keys(), vec!["a", "b"]);
    }

    /// Validates `Index::remove_if_same` against a replaced entry.
    ///
    /// Assertions:
    /// - Ensures a stale entry cannot remove its replacement.
    /// - Ensures the current entry can be removed.
    #[test]
    fn test_remove_if_same_ignores_stale_entry() {
        let mut index = TestIndex::new(4);
        let stale = ready(1);
        index.insert("a", Arc::clone(&stale));
        let fresh = ready(2);
        index.insert("a", Arc::clone(&fresh));

        assert!(!index.remove_if_same(&"a", &stale));
        assert!(index.contains(&"a"));
        assert!(index.remove_if_same(&"a", &fresh));
        assert!(!index.contains(&"a"));
    }

    /// Validates `Index::promote` ordering.
    ///
    /// Assertions:
    /// - Confirms promotion moves the key to the front.
    /// - Ensures promotion of a stale entry is refused.
    #[test]
    fn test_promote_moves_to_front() {
        let mut index = TestIndex::new(3);
        let a = ready(1);
        index.insert("a", Arc::clone(&a));
        index.insert("b", ready(2));
        index.insert("c", ready(3));

        assert!(index.promote(&"a", &a));
        assert_eq!(index.keys(), vec!["a", "c", "b"]);
        assert!(!index.promote(&"b", &a));
        assert!(!index.promote(&"missing", &a));
    }

    /// Validates `Index::remove_expired` scoping.
    ///
    /// Assertions:
    /// - Confirms only entries strictly past their deadline are removed.
    /// - Confirms the surviving entries keep their order.
    #[test]
    fn test_remove_expired_keeps_order_of_survivors() {
        let now = Instant::now();
        let mut index = TestIndex::new(8);
        index.insert("forever", ready(1));
        index.insert("past", expiring(2, now - Duration::from_millis(1)));
        index.insert("future", expiring(3, now + Duration::from_secs(60)));
        index.insert("exact", expiring(4, now));
        index.insert("pending", Arc::new(Entry::reserved()));

        assert_eq!(index.remove_expired(now), 1);
        assert_eq!(index.keys(), vec!["pending", "exact", "future", "forever"]);
        assert_eq!(index.len(), 4);
    }

    /// Validates `Index::clear` and `Index::evict_tail` on an empty index.
    ///
    /// Assertions:
    /// - Confirms `index.len()` equals `0` after clear.
    /// - Confirms eviction from an empty index returns `None`.
    #[test]
    fn test_clear_and_evict_empty() {
        let mut index = TestIndex::new(2);
        index.insert("a", ready(1));
        index.clear();
        assert_eq!(index.len(), 0);
        assert!(index.get(&"a").is_none());
        assert_eq!(index.evict_tail(), None);
    }
}
