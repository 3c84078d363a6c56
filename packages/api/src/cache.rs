//! # Query cache: stale-while-revalidate storage for query results
//!
//! [`QueryCache`] holds the last result of each query under a string key (the request
//! URL, e.g. `"/api/auth/user"`). It is an explicitly constructed handle: clones share
//! the same entries, so the client and every UI consumer see one cache.
//!
//! ## Freshness
//!
//! An entry is *fresh* while it is younger than the staleness window and has not been
//! invalidated. Reads through [`QueryCache::get_fresh`] only return fresh data; the
//! caller fetches again otherwise. [`QueryCache::peek`] returns whatever is cached.
//!
//! ## Ordering
//!
//! Each key carries a generation number. A fetch captures the generation in a
//! [`FetchTicket`] before it suspends; [`QueryCache::complete`] applies the result only
//! if the generation is unchanged. Direct writes ([`QueryCache::set_query_data`]) and
//! invalidations bump the generation, so a slow fetch that started before a logout can
//! never put the old identity back.
//!
//! ## Sharing a fetch
//!
//! [`QueryCache::begin_or_join`] lets concurrent readers of one key share a single
//! request: the first caller gets a [`FetchLease`] and fetches, later callers get a
//! [`FetchWaiter`] that resolves once no fetch for the key is running. Waiters then
//! read the cache again. A lease dropped without being settled (its task was
//! cancelled) still releases the waiters.
//!
//! The lock is never held across an `.await`; every method is a short critical section.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::channel::oneshot;
use parking_lot::Mutex;

#[derive(Debug)]
struct Entry<T> {
    data: Option<T>,
    updated_at: Option<u64>,
    generation: u64,
    invalidated: bool,
    in_flight: usize,
    error: Option<String>,
    waiters: Vec<oneshot::Sender<()>>,
}

impl<T> Entry<T> {
    /// Drop one in-flight fetch; wake the waiters once none remain.
    fn settle(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if self.in_flight == 0 {
            for waiter in self.waiters.drain(..) {
                let _ = waiter.send(());
            }
        }
    }
}

impl<T> Default for Entry<T> {
    fn default() -> Self {
        Self {
            data: None,
            updated_at: None,
            generation: 0,
            invalidated: false,
            in_flight: 0,
            error: None,
            waiters: Vec::new(),
        }
    }
}

/// Proof that a fetch started at a particular generation of a key.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a fetch ticket must be completed or failed"]
pub struct FetchTicket {
    key: String,
    generation: u64,
}

impl FetchTicket {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// A fetch this caller must perform and settle.
///
/// Dropping the lease unsettled releases the key for other readers.
#[must_use = "a fetch lease must be completed or failed"]
pub struct FetchLease<'a, T: Clone> {
    cache: &'a QueryCache<T>,
    ticket: Option<FetchTicket>,
}

impl<T: Clone> FetchLease<'_, T> {
    pub fn ticket(&self) -> Option<&FetchTicket> {
        self.ticket.as_ref()
    }

    /// See [`QueryCache::complete`].
    pub fn complete(mut self, data: T, error: Option<String>, now: u64) -> bool {
        match self.ticket.take() {
            Some(ticket) => self.cache.complete(ticket, data, error, now),
            None => false,
        }
    }

    /// See [`QueryCache::fail`].
    pub fn fail(mut self, error: String) -> bool {
        match self.ticket.take() {
            Some(ticket) => self.cache.fail(ticket, error),
            None => false,
        }
    }
}

impl<T: Clone> Drop for FetchLease<'_, T> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            tracing::debug!(key = ticket.key(), "fetch abandoned");
            self.cache.abandon(ticket);
        }
    }
}

/// Resolves once the fetch a caller joined has settled.
#[derive(Debug)]
pub struct FetchWaiter(oneshot::Receiver<()>);

impl FetchWaiter {
    pub async fn wait(self) {
        // A cancelled sender means the entry is gone, which also ends the wait.
        let _ = self.0.await;
    }
}

/// Outcome of [`QueryCache::begin_or_join`].
pub enum Fetch<'a, T: Clone> {
    /// No fetch was running; the caller performs it.
    Lead(FetchLease<'a, T>),
    /// Another caller is fetching; wait for it, then read the cache.
    Join(FetchWaiter),
}

/// Shared, keyed cache of query results.
pub struct QueryCache<T> {
    entries: Arc<Mutex<HashMap<String, Entry<T>>>>,
}

impl<T> Clone for QueryCache<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<T> Default for QueryCache<T> {
    fn default() -> Self {
        Self {
            entries: Arc::default(),
        }
    }
}

impl<T> std::fmt::Debug for QueryCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("keys", &self.entries.lock().len())
            .finish()
    }
}

impl<T: Clone> QueryCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached data for `key` if it is still fresh at `now`.
    pub fn get_fresh(&self, key: &str, now: u64, stale_time: Duration) -> Option<T> {
        let entries = self.entries.lock();
        let entry = entries.get(key)?;
        if entry.invalidated {
            return None;
        }
        let updated_at = entry.updated_at?;
        let age = now.saturating_sub(updated_at);
        if u128::from(age) >= stale_time.as_millis() {
            return None;
        }
        entry.data.clone()
    }

    /// Cached data for `key`, fresh or not.
    pub fn peek(&self, key: &str) -> Option<T> {
        self.entries.lock().get(key)?.data.clone()
    }

    pub fn has_data(&self, key: &str) -> bool {
        self.entries
            .lock()
            .get(key)
            .is_some_and(|entry| entry.data.is_some())
    }

    /// Whether the entry would be re-fetched on the next read.
    pub fn is_stale(&self, key: &str, now: u64, stale_time: Duration) -> bool {
        self.get_fresh(key, now, stale_time).is_none()
    }

    /// Register a fetch for `key` and capture its current generation.
    pub fn begin_fetch(&self, key: &str) -> FetchTicket {
        let mut entries = self.entries.lock();
        let entry = entries.entry(key.to_string()).or_default();
        entry.in_flight += 1;
        FetchTicket {
            key: key.to_string(),
            generation: entry.generation,
        }
    }

    /// Start a fetch for `key`, or join the one already running.
    pub fn begin_or_join(&self, key: &str) -> Fetch<'_, T> {
        let mut entries = self.entries.lock();
        let entry = entries.entry(key.to_string()).or_default();
        if entry.in_flight > 0 {
            let (tx, rx) = oneshot::channel();
            entry.waiters.push(tx);
            return Fetch::Join(FetchWaiter(rx));
        }
        entry.in_flight += 1;
        Fetch::Lead(FetchLease {
            cache: self,
            ticket: Some(FetchTicket {
                key: key.to_string(),
                generation: entry.generation,
            }),
        })
    }

    /// Give up on a fetch without recording anything.
    pub fn abandon(&self, ticket: FetchTicket) {
        if let Some(entry) = self.entries.lock().get_mut(&ticket.key) {
            entry.settle();
        }
    }

    /// Settle a fetch with data and an optional error note.
    ///
    /// Returns `false`, leaving the entry untouched, when the key was overwritten or
    /// invalidated after the fetch began.
    pub fn complete(&self, ticket: FetchTicket, data: T, error: Option<String>, now: u64) -> bool {
        let mut entries = self.entries.lock();
        let entry = entries.entry(ticket.key).or_default();
        entry.settle();
        if entry.generation != ticket.generation {
            return false;
        }
        entry.data = Some(data);
        entry.updated_at = Some(now);
        entry.invalidated = false;
        entry.error = error;
        true
    }

    /// Settle a fetch that produced no data. Previously cached data is kept.
    pub fn fail(&self, ticket: FetchTicket, error: String) -> bool {
        let mut entries = self.entries.lock();
        let entry = entries.entry(ticket.key).or_default();
        entry.settle();
        if entry.generation != ticket.generation {
            return false;
        }
        entry.error = Some(error);
        true
    }

    /// Overwrite `key` directly. In-flight fetches for the key will be discarded.
    pub fn set_query_data(&self, key: &str, data: T, now: u64) {
        let mut entries = self.entries.lock();
        let entry = entries.entry(key.to_string()).or_default();
        entry.generation += 1;
        entry.data = Some(data);
        entry.updated_at = Some(now);
        entry.invalidated = false;
        entry.error = None;
    }

    /// Mark `key` stale so the next read fetches again. Cached data stays readable
    /// through [`QueryCache::peek`].
    pub fn invalidate(&self, key: &str) {
        if let Some(entry) = self.entries.lock().get_mut(key) {
            entry.generation += 1;
            entry.invalidated = true;
        }
    }

    /// Mark stale every key whose path (the part before `?`) is `path`.
    pub fn invalidate_path(&self, path: &str) {
        for (key, entry) in self.entries.lock().iter_mut() {
            if key.split('?').next() == Some(path) {
                entry.generation += 1;
                entry.invalidated = true;
            }
        }
    }

    /// Mark every key stale.
    pub fn invalidate_all(&self) {
        for entry in self.entries.lock().values_mut() {
            entry.generation += 1;
            entry.invalidated = true;
        }
    }

    pub fn is_fetching(&self, key: &str) -> bool {
        self.entries
            .lock()
            .get(key)
            .is_some_and(|entry| entry.in_flight > 0)
    }

    /// Error recorded by the last settled fetch, if it failed.
    pub fn error(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key)?.error.clone()
    }

    pub fn updated_at(&self, key: &str) -> Option<u64> {
        self.entries.lock().get(key)?.updated_at
    }

    pub fn remove(&self, key: &str) {
        if let Some(entry) = self.entries.lock().get_mut(key) {
            // Keep the entry so in-flight tickets still see a newer generation.
            entry.generation += 1;
            entry.data = None;
            entry.updated_at = None;
            entry.invalidated = false;
            entry.error = None;
        }
    }

    pub fn clear(&self) {
        for entry in self.entries.lock().values_mut() {
            entry.generation += 1;
            entry.data = None;
            entry.updated_at = None;
            entry.invalidated = false;
            entry.error = None;
        }
    }
}
