//! Memoizer whose map is owned by a single coordinating thread
//!
//! Callers never touch the map. They send a request over a channel and get
//! back the key's entry, then wait on it outside the coordinator. The first
//! request for a key starts a worker thread that runs the function and
//! publishes the entry.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use tracing::{debug, warn};

use super::{MemoFn, Memoize};
use crate::cache::entry::{Entry, Outcome, Publisher};
use crate::error::{CacheError, CacheResult};

/// A lookup sent to the coordinator
struct Request<K, V, E> {
    key: K,
    reply: Sender<Arc<Entry<V, E>>>,
}

/// Memoizer built on message passing instead of a shared lock
///
/// Dropping the memo (or calling [`close`](Self::close)) closes the request
/// channel and joins the coordinator. Lookups after that fail with
/// [`CacheError::Closed`]. Worker threads still computing are left to finish
/// on their own.
pub struct MonitorMemo<K, V, E> {
    requests: Option<Sender<Request<K, V, E>>>,
    coordinator: Option<JoinHandle<()>>,
}

impl<K, V, E> MonitorMemo<K, V, E>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
    E: Send + Sync + 'static,
{
    /// Memoize `func`, starting the coordinator thread
    pub fn new<F>(func: F) -> io::Result<Self>
    where
        F: Fn(&K) -> Result<V, E> + Send + Sync + 'static,
    {
        let (requests, inbox) = unbounded();
        let func: MemoFn<K, V, E> = Arc::new(func);
        let coordinator = thread::Builder::new()
            .name("flightcache-memo".into())
            .spawn(move || serve(&inbox, &func))?;

        Ok(Self { requests: Some(requests), coordinator: Some(coordinator) })
    }
}

impl<K, V, E> MonitorMemo<K, V, E> {
    /// Stop accepting requests and wait for the coordinator to exit
    pub fn close(&mut self) {
        self.requests.take();
        if let Some(coordinator) = self.coordinator.take() {
            if coordinator.join().is_err() {
                warn!("memo coordinator panicked");
            }
        }
    }

    /// Whether [`close`](Self::close) has been called
    pub const fn is_closed(&self) -> bool {
        self.requests.is_none()
    }
}

impl<K, V, E> Memoize<K, V, E> for MonitorMemo<K, V, E>
where
    V: Clone,
    K: Clone,
{
    fn get(&self, key: &K) -> CacheResult<V, E> {
        let requests = self.requests.as_ref().ok_or(CacheError::Closed)?;
        let (reply, response) = bounded(1);
        requests.send(Request { key: key.clone(), reply }).map_err(|_| CacheError::Closed)?;
        let entry = response.recv().map_err(|_| CacheError::Closed)?;
        entry.wait().into_result()
    }
}

impl<K, V, E> fmt::Debug for MonitorMemo<K, V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitorMemo").field("closed", &self.is_closed()).finish()
    }
}

impl<K, V, E> Drop for MonitorMemo<K, V, E> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Coordinator loop; runs until every request sender is gone
fn serve<K, V, E>(inbox: &Receiver<Request<K, V, E>>, func: &MemoFn<K, V, E>)
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Send + 'static,
    E: Send + Sync + 'static,
{
    let mut entries: HashMap<K, Arc<Entry<V, E>>> = HashMap::new();
    for Request { key, reply } in inbox {
        let entry = match entries.get(&key) {
            Some(entry) => Arc::clone(entry),
            None => {
                let entry = Arc::new(Entry::reserved());
                entries.insert(key.clone(), Arc::clone(&entry));
                start_worker(Arc::clone(func), key, Publisher::new(Arc::clone(&entry)));
                entry
            }
        };
        // The caller may have given up; nothing to deliver then.
        let _ = reply.send(entry);
    }
    debug!(keys = entries.len(), "memo coordinator shutting down");
}

/// Compute `key` on its own thread and publish the result
///
/// If the thread cannot be spawned the publisher is dropped with the
/// closure, which releases waiters with [`CacheError::Abandoned`].
fn start_worker<K, V, E>(func: MemoFn<K, V, E>, key: K, publisher: Publisher<V, E>)
where
    K: Send + 'static,
    V: Send + 'static,
    E: Send + Sync + 'static,
{
    let spawned = thread::Builder::new().name("flightcache-memo-worker".into()).spawn(move || {
        let mut publisher = publisher;
        publisher.publish(Outcome::settled(func(&key)));
    });
    if let Err(err) = spawned {
        warn!(%err, "failed to spawn memo worker");
    }
}
