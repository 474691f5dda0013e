//! Specialized data structures
//!
//! - **[`recency`]**: arena-backed doubly linked list ordering entries from
//!   most to least recently used
//!
//! ## Usage
//!
//! ```
//! use flightcache::collections::RecencyList;
//!
//! let mut order = RecencyList::new();
//! let first = order.push_front(1);
//! order.push_front(2);
//! order.move_to_front(first);
//! assert_eq!(order.back(), Some(&2));
//! ```

pub mod recency;

// Re-export commonly used types
pub use recency::{Handle, RecencyList};
