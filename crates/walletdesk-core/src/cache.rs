//! Client-side query cache.
//!
//! Results are stored per [`QueryKey`] and considered fresh for a stale time.
//! Concurrent fetches for an equal key share one in-flight request; the
//! request is cancelled once its last waiter goes away. Entries nobody has
//! read for the gc time are swept on the next fetch or by [`QueryClient::gc`].

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{ApiError, ClientError};

pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_GC_TIME: Duration = Duration::from_secs(5 * 60);

type CachedValue = Arc<dyn Any + Send + Sync>;
type SharedFetch = Shared<BoxFuture<'static, Result<CachedValue, ClientError>>>;

/// How a fetch interacts with cached entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Serve a fresh entry if present, otherwise fetch and store.
    #[default]
    Use,
    /// Always fetch and store the result.
    Refresh,
    /// Fetch without reading, storing, or sharing.
    Bypass,
}

/// Structured cache key: a list of JSON segments, e.g. `["customers", {...filters}]`.
///
/// Two keys are equal when their segments serialize identically.
#[derive(Clone)]
pub struct QueryKey {
    segments: Vec<Value>,
    canonical: String,
}

impl QueryKey {
    pub fn new(root: &str) -> Self {
        Self::from_segments(vec![Value::String(root.to_owned())])
    }

    /// Appends a segment; values that cannot be represented as JSON become `null`.
    pub fn with(self, segment: impl Serialize) -> Self {
        let mut segments = self.segments;
        segments.push(serde_json::to_value(segment).unwrap_or(Value::Null));
        Self::from_segments(segments)
    }

    fn from_segments(segments: Vec<Value>) -> Self {
        let canonical = Value::Array(segments.clone()).to_string();
        Self {
            segments,
            canonical,
        }
    }

    pub fn segments(&self) -> &[Value] {
        &self.segments
    }

    /// True when `prefix`'s segments are a leading run of this key's.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        prefix.segments.len() <= self.segments.len()
            && self.segments.iter().zip(&prefix.segments).all(|(a, b)| a == b)
    }
}

impl PartialEq for QueryKey {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for QueryKey {}

impl Hash for QueryKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl fmt::Debug for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QueryKey({})", self.canonical)
    }
}

struct CacheEntry {
    value: CachedValue,
    updated_at: Instant,
    last_used: Instant,
    invalidated: bool,
}

impl CacheEntry {
    fn new(value: CachedValue) -> Self {
        let now = Instant::now();
        Self {
            value,
            updated_at: now,
            last_used: now,
            invalidated: false,
        }
    }

    fn is_fresh(&self, stale_time: Duration) -> bool {
        !self.invalidated && self.updated_at.elapsed() < stale_time
    }
}

struct InFlight {
    id: u64,
    fetch: SharedFetch,
    token: CancellationToken,
    waiters: usize,
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<QueryKey, CacheEntry>,
    in_flight: HashMap<QueryKey, InFlight>,
    /// Flights cut loose by invalidation, keyed by id. Their results are
    /// never stored but they still cancel once abandoned.
    detached: HashMap<u64, InFlight>,
    next_id: u64,
}

impl CacheInner {
    fn detach_where(&mut self, matches: impl Fn(&QueryKey) -> bool) {
        let keys: Vec<QueryKey> = self
            .in_flight
            .keys()
            .filter(|key| matches(*key))
            .cloned()
            .collect();
        for key in keys {
            if let Some(flight) = self.in_flight.remove(&key) {
                self.detached.insert(flight.id, flight);
            }
        }
    }

    fn sweep(&mut self, gc_time: Duration) -> usize {
        let Self { entries, in_flight, .. } = self;
        let before = entries.len();
        entries.retain(|key, entry| {
            in_flight.contains_key(key) || entry.last_used.elapsed() < gc_time
        });
        before - entries.len()
    }
}

/// Shared, cloneable handle to the query cache.
#[derive(Clone)]
pub struct QueryClient {
    inner: Arc<Mutex<CacheInner>>,
    stale_time: Duration,
    gc_time: Duration,
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new(DEFAULT_STALE_TIME)
    }
}

impl fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("QueryClient")
            .field("stale_time", &self.stale_time)
            .field("gc_time", &self.gc_time)
            .field("entries", &inner.entries.len())
            .field("in_flight", &(inner.in_flight.len() + inner.detached.len()))
            .finish()
    }
}

impl QueryClient {
    pub fn new(stale_time: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CacheInner::default())),
            stale_time,
            gc_time: DEFAULT_GC_TIME,
        }
    }

    /// How long an unused entry survives before a sweep drops it.
    pub fn with_gc_time(mut self, gc_time: Duration) -> Self {
        self.gc_time = gc_time;
        self
    }

    pub const fn stale_time(&self) -> Duration {
        self.stale_time
    }

    pub const fn gc_time(&self) -> Duration {
        self.gc_time
    }

    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Cached value for `key`, fresh or not.
    pub fn get_query_data<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let mut inner = self.lock();
        let entry = inner.entries.get_mut(key)?;
        entry.last_used = Instant::now();
        Arc::clone(&entry.value).downcast::<T>().ok()
    }

    pub fn set_query_data<T: Send + Sync + 'static>(&self, key: QueryKey, value: T) {
        self.lock()
            .entries
            .insert(key, CacheEntry::new(Arc::new(value)));
    }

    pub fn is_fresh(&self, key: &QueryKey, stale_time: Duration) -> bool {
        self.lock()
            .entries
            .get(key)
            .is_some_and(|entry| entry.is_fresh(stale_time))
    }

    /// Marks every entry under `prefix` stale and detaches in-flight fetches
    /// so their results are not stored. Returns the number of entries marked.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut inner = self.lock();
        let mut marked = 0;
        for (key, entry) in &mut inner.entries {
            if key.starts_with(prefix) {
                entry.invalidated = true;
                marked += 1;
            }
        }
        inner.detach_where(|key| key.starts_with(prefix));
        debug!(prefix = %prefix, marked, "invalidated cached queries");
        marked
    }

    /// Drops every entry under `prefix`.
    pub fn remove(&self, prefix: &QueryKey) {
        self.lock().entries.retain(|key, _| !key.starts_with(prefix));
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.detach_where(|_| true);
    }

    /// Drops entries unused for longer than the gc time, except those with a
    /// fetch in flight. Returns the number dropped.
    pub fn gc(&self) -> usize {
        let evicted = self.lock().sweep(self.gc_time);
        if evicted > 0 {
            debug!(evicted, "evicted unused cache entries");
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Running requests, including those detached by invalidation.
    pub fn in_flight(&self) -> usize {
        let inner = self.lock();
        inner.in_flight.len() + inner.detached.len()
    }

    /// Resolves `key`, calling `fetcher` only when needed.
    ///
    /// `fetcher` receives the cancellation token of the shared request; it is
    /// cancelled when every caller waiting on the request has gone away.
    pub async fn fetch<T, F, Fut>(
        &self,
        key: &QueryKey,
        mode: CacheMode,
        stale_time: Duration,
        fetcher: F,
    ) -> Result<Arc<T>, ClientError>
    where
        T: Send + Sync + 'static,
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
    {
        if mode == CacheMode::Bypass {
            return fetcher(CancellationToken::new()).await.map(Arc::new);
        }

        let (id, fetch) = {
            let mut inner = self.lock();
            let evicted = inner.sweep(self.gc_time);
            if evicted > 0 {
                debug!(evicted, "evicted unused cache entries");
            }

            if mode == CacheMode::Use {
                let fresh = inner
                    .entries
                    .get_mut(key)
                    .filter(|entry| entry.is_fresh(stale_time));
                if let Some(entry) = fresh {
                    if let Ok(value) = Arc::clone(&entry.value).downcast::<T>() {
                        entry.last_used = Instant::now();
                        debug!(key = %key, "serving fresh cache entry");
                        return Ok(value);
                    }
                }
            }

            match inner.in_flight.get_mut(key) {
                Some(flight) => {
                    flight.waiters += 1;
                    debug!(key = %key, waiters = flight.waiters, "joining in-flight request");
                    (flight.id, flight.fetch.clone())
                }
                None => {
                    let token = CancellationToken::new();
                    let fetch = fetcher(token.clone())
                        .map(|result| result.map(|value| Arc::new(value) as CachedValue))
                        .boxed()
                        .shared();
                    let id = inner.next_id;
                    inner.next_id += 1;
                    inner.in_flight.insert(
                        key.clone(),
                        InFlight {
                            id,
                            fetch: fetch.clone(),
                            token,
                            waiters: 1,
                        },
                    );
                    (id, fetch)
                }
            }
        };

        let mut waiter = Waiter {
            client: self,
            key,
            id,
            done: false,
        };
        let result = fetch.await;
        waiter.done = true;
        self.settle(key, id, &result);

        let value = result?;
        value.downcast::<T>().map_err(|_| {
            warn!(key = %key, "cached value has an unexpected type");
            ClientError::Api(ApiError::transport(
                "cached value has an unexpected type",
                key.to_string(),
            ))
        })
    }

    fn settle(&self, key: &QueryKey, id: u64, result: &Result<CachedValue, ClientError>) {
        let mut inner = self.lock();
        let owned = inner.in_flight.get(key).is_some_and(|flight| flight.id == id);
        if !owned {
            inner.detached.remove(&id);
            return;
        }

        inner.in_flight.remove(key);
        if let Ok(value) = result {
            inner
                .entries
                .insert(key.clone(), CacheEntry::new(Arc::clone(value)));
        }
    }

    fn leave(&self, key: &QueryKey, id: u64) {
        let mut inner = self.lock();
        let attached = inner.in_flight.get(key).is_some_and(|flight| flight.id == id);
        let flight = if attached {
            inner.in_flight.get_mut(key)
        } else {
            inner.detached.get_mut(&id)
        };
        let Some(flight) = flight else {
            return;
        };

        flight.waiters = flight.waiters.saturating_sub(1);
        if flight.waiters == 0 {
            flight.token.cancel();
            if attached {
                inner.in_flight.remove(key);
            } else {
                inner.detached.remove(&id);
            }
            debug!(key = %key, "last waiter left, request cancelled");
        }
    }
}

/// Deregisters a waiter that stops awaiting before the fetch completes.
struct Waiter<'a> {
    client: &'a QueryClient,
    key: &'a QueryKey,
    id: u64,
    done: bool,
}

impl Drop for Waiter<'_> {
    fn drop(&mut self) {
        if !self.done {
            self.client.leave(self.key, self.id);
        }
    }
}
