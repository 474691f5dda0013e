//! Cache entries and their publish-once readiness signal
//!
//! An [`Entry`] is created either *reserved* (a computation is pending) or
//! already *ready*. A reserved entry is published exactly once through its
//! [`Publisher`]; from then on its [`Outcome`] never changes, so any number of
//! threads may read it without holding the index lock.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Condvar, Mutex};

use crate::error::{CacheError, CacheResult};

/// Terminal state of an entry
#[derive(Debug)]
pub(crate) enum Outcome<V, E> {
    /// The value is available until `expires_at` (never, when `None`)
    Ready { value: V, expires_at: Option<Instant> },
    /// The computation failed
    Failed(Arc<E>),
    /// The owning computation unwound without publishing
    Abandoned,
}

impl<V, E> Outcome<V, E> {
    /// Outcome of a finished computation whose value never expires
    pub(crate) fn settled(result: Result<V, E>) -> Self {
        match result {
            Ok(value) => Self::Ready { value, expires_at: None },
            Err(err) => Self::Failed(Arc::new(err)),
        }
    }

    /// The value or error a caller receives, ignoring expiration
    pub(crate) fn into_result(self) -> CacheResult<V, E> {
        match self {
            Self::Ready { value, .. } => Ok(value),
            Self::Failed(err) => Err(CacheError::Compute(err)),
            Self::Abandoned => Err(CacheError::Abandoned),
        }
    }
}

impl<V: Clone, E> Clone for Outcome<V, E> {
    fn clone(&self) -> Self {
        match self {
            Self::Ready { value, expires_at } => {
                Self::Ready { value: value.clone(), expires_at: *expires_at }
            }
            Self::Failed(err) => Self::Failed(Arc::clone(err)),
            Self::Abandoned => Self::Abandoned,
        }
    }
}

/// A single cached slot
#[derive(Debug)]
pub(crate) struct Entry<V, E> {
    state: Mutex<Option<Outcome<V, E>>>,
    ready: Condvar,
}

impl<V, E> Entry<V, E> {
    /// An entry whose computation has not finished yet
    pub(crate) fn reserved() -> Self {
        Self { state: Mutex::new(None), ready: Condvar::new() }
    }

    /// An entry that is ready from the start (used by `set`)
    pub(crate) fn ready(value: V, expires_at: Option<Instant>) -> Self {
        Self {
            state: Mutex::new(Some(Outcome::Ready { value, expires_at })),
            ready: Condvar::new(),
        }
    }

    /// Makes `outcome` visible to all current and future waiters.
    ///
    /// Returns `false` and leaves the entry untouched if it was already
    /// published.
    fn publish(&self, outcome: Outcome<V, E>) -> bool {
        let mut state = self.state.lock();
        if state.is_some() {
            return false;
        }
        *state = Some(outcome);
        drop(state);
        self.ready.notify_all();
        true
    }

    /// Whether the entry has been published
    pub(crate) fn is_ready(&self) -> bool {
        self.state.lock().is_some()
    }

    /// True when the entry is ready, carries an expiration and `now` is past it.
    ///
    /// Reserved entries never count as expired.
    pub(crate) fn is_expired(&self, now: Instant) -> bool {
        matches!(
            &*self.state.lock(),
            Some(Outcome::Ready { expires_at: Some(at), .. }) if now > *at
        )
    }
}

impl<V: Clone, E> Entry<V, E> {
    /// Blocks until the entry is published and returns its outcome.
    ///
    /// Returns immediately for ready entries.
    pub(crate) fn wait(&self) -> Outcome<V, E> {
        let mut state = self.state.lock();
        loop {
            if let Some(outcome) = state.as_ref() {
                return outcome.clone();
            }
            self.ready.wait(&mut state);
        }
    }
}

/// Sole writer of a reserved entry's outcome
///
/// Dropping a publisher that never published (the computation panicked)
/// publishes [`Outcome::Abandoned`] so waiters are released instead of
/// blocking forever.
#[derive(Debug)]
pub(crate) struct Publisher<V, E> {
    entry: Arc<Entry<V, E>>,
    published: bool,
}

impl<V, E> Publisher<V, E> {
    pub(crate) const fn new(entry: Arc<Entry<V, E>>) -> Self {
        Self { entry, published: false }
    }

    pub(crate) const fn entry(&self) -> &Arc<Entry<V, E>> {
        &self.entry
    }

    pub(crate) const fn is_published(&self) -> bool {
        self.published
    }

    pub(crate) fn publish(&mut self, outcome: Outcome<V, E>) {
        self.published = self.entry.publish(outcome) || self.published;
    }
}

impl<V, E> Drop for Publisher<V, E> {
    fn drop(&mut self) {
        if !self.published {
            self.entry.publish(Outcome::Abandoned);
        }
    }
}
