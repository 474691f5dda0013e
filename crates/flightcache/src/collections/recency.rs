//! Recency ordering backed by an indexable doubly linked list.
//!
//! Nodes live in a `Vec` arena and link to each other by slot index, so the
//! list needs no shared pointers and no `unsafe`. Removed slots are recycled
//! through a free list.
//!
//! # Complexity
//! - `push_front`, `move_to_front`, `remove`, `pop_back`, `get`: `O(1)`.
//! - `clear`: `O(n)` due to drops.
//!
//! # Handles
//! [`Handle`]s stay valid until the node they name is removed. After removal
//! the slot may be reused, so callers must drop handles to removed nodes (the
//! cache index does this by keeping handles only in its key map).

use std::fmt;
use std::iter::FusedIterator;

type NodeSlot<T> = Option<Node<T>>;

/// Stable address of a node inside a [`RecencyList`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(usize);

/// Ordered sequence from most recently used (front) to least recently used
/// (back).
///
/// # Examples
///
/// ```
/// use flightcache::collections::RecencyList;
///
/// let mut list = RecencyList::new();
/// let a = list.push_front("a");
/// list.push_front("b");
/// list.push_front("c");
///
/// list.move_to_front(a);
/// assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec!["a", "c", "b"]);
/// assert_eq!(list.pop_back(), Some("b"));
/// ```
pub struct RecencyList<T> {
    nodes: Vec<NodeSlot<T>>,
    free_list: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<T> RecencyList<T> {
    /// Creates an empty list.
    pub const fn new() -> Self {
        Self { nodes: Vec::new(), free_list: Vec::new(), head: None, tail: None, len: 0 }
    }

    /// Creates an empty list with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { nodes: Vec::with_capacity(capacity), ..Self::new() }
    }

    /// Returns the number of linked nodes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` when the list has no nodes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes every node.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free_list.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Links `value` at the front (most recently used) position.
    pub fn push_front(&mut self, value: T) -> Handle {
        let index = self.allocate_slot(value);
        self.attach_front(index);
        self.len += 1;
        Handle(index)
    }

    /// Promotes the node to the front. No-op when it already is the front.
    pub fn move_to_front(&mut self, handle: Handle) {
        let index = handle.0;
        if self.head == Some(index) || !self.is_linked(index) {
            return;
        }
        self.detach(index);
        self.attach_front(index);
    }

    /// Unlinks the node at an arbitrary position and returns its value.
    pub fn remove(&mut self, handle: Handle) -> Option<T> {
        let index = handle.0;
        if !self.is_linked(index) {
            return None;
        }
        self.detach(index);
        self.release(index)
    }

    /// Unlinks the back (least recently used) node and returns its value.
    pub fn pop_back(&mut self) -> Option<T> {
        let index = self.tail?;
        self.detach(index);
        self.release(index)
    }

    /// Borrows the value behind `handle`.
    #[must_use]
    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.nodes.get(handle.0).and_then(Option::as_ref).map(|node| &node.value)
    }

    /// Borrows the front (most recently used) value.
    #[must_use]
    pub fn front(&self) -> Option<&T> {
        self.head.and_then(|index| self.get(Handle(index)))
    }

    /// Borrows the back (least recently used) value.
    #[must_use]
    pub fn back(&self) -> Option<&T> {
        self.tail.and_then(|index| self.get(Handle(index)))
    }

    /// Returns an iterator from front to back.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { list: self, current: self.head, remaining: self.len }
    }

    /// Returns an iterator over `(handle, value)` pairs from front to back.
    pub fn handles(&self) -> Handles<'_, T> {
        Handles { list: self, current: self.head, remaining: self.len }
    }

    fn is_linked(&self, index: usize) -> bool {
        matches!(self.nodes.get(index), Some(Some(_)))
    }

    fn allocate_slot(&mut self, value: T) -> usize {
        if let Some(index) = self.free_list.pop() {
            self.nodes[index] = Some(Node::new(value));
            index
        } else {
            self.nodes.push(Some(Node::new(value)));
            self.nodes.len() - 1
        }
    }

    fn release(&mut self, index: usize) -> Option<T> {
        let node = self.nodes.get_mut(index).and_then(Option::take)?;
        self.free_list.push(index);
        self.len = self.len.saturating_sub(1);
        Some(node.value)
    }

    fn detach(&mut self, index: usize) {
        let (prev, next) = match self.nodes.get(index).and_then(Option::as_ref) {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        match prev {
            Some(prev_index) => {
                if let Some(prev_node) = self.nodes.get_mut(prev_index).and_then(Option::as_mut) {
                    prev_node.next = next;
                }
            }
            None => self.head = next,
        }

        match next {
            Some(next_index) => {
                if let Some(next_node) = self.nodes.get_mut(next_index).and_then(Option::as_mut) {
                    next_node.prev = prev;
                }
            }
            None => self.tail = prev,
        }

        if let Some(node) = self.nodes.get_mut(index).and_then(Option::as_mut) {
            node.prev = None;
            node.next = None;
        }
    }

    fn attach_front(&mut self, index: usize) {
        if let Some(node) = self.nodes.get_mut(index).and_then(Option::as_mut) {
            node.prev = None;
            node.next = self.head;
        }

        if let Some(head_index) = self.head {
            if let Some(head_node) = self.nodes.get_mut(head_index).and_then(Option::as_mut) {
                head_node.prev = Some(index);
            }
        } else {
            self.tail = Some(index);
        }

        self.head = Some(index);
    }

    fn next_of(&self, index: usize) -> Option<(usize, &T, Option<usize>)> {
        let node = self.nodes.get(index).and_then(Option::as_ref)?;
        Some((index, &node.value, node.next))
    }
}

impl<T> Default for RecencyList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for RecencyList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecencyList")
            .field("len", &self.len)
            .field("slots", &self.nodes.len())
            .finish()
    }
}

#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: Option<usize>,
    next: Option<usize>,
}

impl<T> Node<T> {
    const fn new(value: T) -> Self {
        Self { value, prev: None, next: None }
    }
}

/// Iterator over list values from front to back.
pub struct Iter<'a, T> {
    list: &'a RecencyList<T>,
    current: Option<usize>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let (_, value, next) = self.list.next_of(self.current?)?;
        self.current = next;
        self.remaining = self.remaining.saturating_sub(1);
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

/// Iterator over `(handle, value)` pairs from front to back.
pub struct Handles<'a, T> {
    list: &'a RecencyList<T>,
    current: Option<usize>,
    remaining: usize,
}

impl<'a, T> Iterator for Handles<'a, T> {
    type Item = (Handle, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let (index, value, next) = self.list.next_of(self.current?)?;
        self.current = next;
        self.remaining = self.remaining.saturating_sub(1);
        Some((Handle(index), value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> FusedIterator for Handles<'_, T> {}

#[cfg(test)]
mod tests {
    //! Unit tests for collections::recency.
    use super::*;

    fn order(list: &RecencyList<&'static str>) -> Vec<&'static str> {
        list.iter().copied().collect()
    }

    fn reverse_order(list: &RecencyList<&'static str>) -> Vec<&'static str> {
        let mut out = Vec::new();
        let mut current = list.tail;
        while let Some(index) = current {
            let node = list.nodes[index].as_ref().expect("linked slot");
            out.push(node.value);
            current = node.prev;
        }
        out
    }

    /// Validates the push front ordering scenario.
    ///
    /// Assertions:
    /// - Confirms `order(&list)` equals `vec!["c", "b", "a"]`.
    /// - Confirms `list.front()` equals `Some(&"c")` and `list.back()` equals
    ///   `Some(&"a")`.
    #[test]
    fn push_front_orders_most_recent_first() {
        let mut list = RecencyList::new();
        list.push_front("a");
        list.push_front("b");
        list.push_front("c");

        assert_eq!(order(&list), vec!["c", "b", "a"]);
        assert_eq!(list.front(), Some(&"c"));
        assert_eq!(list.back(), Some(&"a"));
        assert_eq!(list.len(), 3);
    }

    /// Validates the move to front scenario for tail, middle and head nodes.
    ///
    /// Assertions:
    /// - Confirms forward and reverse traversals agree after each move.
    /// - Confirms moving the head is a no-op.
    #[test]
    fn move_to_front_relinks_consistently() {
        let mut list = RecencyList::new();
        let a = list.push_front("a");
        let b = list.push_front("b");
        let c = list.push_front("c");

        list.move_to_front(a);
        assert_eq!(order(&list), vec!["a", "c", "b"]);
        assert_eq!(reverse_order(&list), vec!["b", "c", "a"]);

        list.move_to_front(c);
        assert_eq!(order(&list), vec!["c", "a", "b"]);
        assert_eq!(reverse_order(&list), vec!["b", "a", "c"]);

        list.move_to_front(c);
        assert_eq!(order(&list), vec!["c", "a", "b"]);

        list.move_to_front(b);
        assert_eq!(order(&list), vec!["b", "c", "a"]);
        assert_eq!(list.back(), Some(&"a"));
    }

    /// Validates the pop back scenario down to an empty list.
    ///
    /// Assertions:
    /// - Confirms values pop in least-recently-used order.
    /// - Ensures `head` and `tail` are `None` once empty.
    #[test]
    fn pop_back_drains_in_lru_order() {
        let mut list = RecencyList::new();
        list.push_front(1);
        list.push_front(2);
        list.push_front(3);

        assert_eq!(list.pop_back(), Some(1));
        assert_eq!(list.pop_back(), Some(2));
        assert_eq!(list.pop_back(), Some(3));
        assert_eq!(list.pop_back(), None);
        assert!(list.is_empty());
        assert!(list.head.is_none());
        assert!(list.tail.is_none());
    }

    /// Validates the remove scenario for head, middle and tail positions.
    ///
    /// Assertions:
    /// - Confirms each removal returns the stored value.
    /// - Confirms a second removal of the same handle returns `None`.
    #[test]
    fn remove_from_any_position() {
        let mut list = RecencyList::new();
        let a = list.push_front("a");
        let b = list.push_front("b");
        let c = list.push_front("c");
        let d = list.push_front("d");

        assert_eq!(list.remove(b), Some("b"));
        assert_eq!(order(&list), vec!["d", "c", "a"]);
        assert_eq!(reverse_order(&list), vec!["a", "c", "d"]);

        assert_eq!(list.remove(d), Some("d"));
        assert_eq!(list.front(), Some(&"c"));

        assert_eq!(list.remove(a), Some("a"));
        assert_eq!(list.back(), Some(&"c"));

        assert_eq!(list.remove(a), None);
        assert_eq!(list.remove(c), Some("c"));
        assert!(list.is_empty());
        assert!(list.head.is_none() && list.tail.is_none());
    }

    /// Validates the slot reuse scenario.
    ///
    /// Assertions:
    /// - Confirms the arena does not grow when a freed slot is available.
    #[test]
    fn freed_slots_are_reused() {
        let mut list = RecencyList::with_capacity(2);
        let a = list.push_front("a");
        list.push_front("b");
        list.remove(a);
        list.push_front("c");

        assert_eq!(list.nodes.len(), 2);
        assert_eq!(order(&list), vec!["c", "b"]);
    }

    /// Validates the handles iterator scenario.
    ///
    /// Assertions:
    /// - Confirms each yielded handle resolves to the yielded value.
    #[test]
    fn handles_resolve_to_values() {
        let mut list = RecencyList::new();
        list.push_front(10);
        list.push_front(20);

        let pairs: Vec<_> = list.handles().collect();
        assert_eq!(pairs.len(), 2);
        for (handle, value) in pairs {
            assert_eq!(list.get(handle), Some(value));
        }
    }

    /// Validates the clear scenario.
    ///
    /// Assertions:
    /// - Confirms `list.len()` equals `0` and iteration yields nothing.
    #[test]
    fn clear_resets_everything() {
        let mut list = RecencyList::new();
        list.push_front("a");
        list.push_front("b");
        list.clear();

        assert_eq!(list.len(), 0);
        assert_eq!(list.iter().count(), 0);
        assert!(list.front().is_none());
    }
}
