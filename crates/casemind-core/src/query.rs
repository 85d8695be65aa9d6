//! Keyed query cache with request coalescing, staleness and invalidation.
//!
//! Entries are keyed by [`QueryKey`] and hold the last successful value, the
//! last error and the fetch bookkeeping. Values are stored type-erased and
//! handed out as `Arc<T>`.
//!
//! Invalidation bumps an entry's epoch. A fetch records the epoch it started
//! in, so a fetch that was already running when the key was invalidated still
//! lands its data but leaves the entry stale, and the next read refetches.
//!
//! Entries nobody has read for [`DEFAULT_IDLE_TIMEOUT`] are dropped the next
//! time any key is fetched.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};
use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{ApiError, Result};
use crate::notify::{Listeners, SubscriptionId};

/// How long an entry may go unread before it is evicted.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::minutes(5);

/// Resource name followed by the parameters that identify one result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new(resource: impl Into<String>) -> Self {
        Self(vec![resource.into()])
    }

    pub fn with(mut self, part: impl Into<String>) -> Self {
        self.0.push(part.into());
        self
    }

    /// Append a parameter set as one canonical, form-encoded part.
    pub fn with_params(self, params: &[(String, String)]) -> Self {
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .finish();
        self.with(encoded)
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }

    pub fn resource(&self) -> &str {
        self.0.first().map(String::as_str).unwrap_or_default()
    }

    /// Whether `prefix` matches the leading parts of this key.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

/// How long a successful result stays fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StalePolicy {
    /// Fresh until invalidated or explicitly refetched.
    Manual,
    After(Duration),
}

impl StalePolicy {
    pub fn seconds(secs: i64) -> Self {
        StalePolicy::After(Duration::seconds(secs))
    }

    fn is_fresh(&self, updated_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            StalePolicy::Manual => true,
            StalePolicy::After(window) => now - updated_at < *window,
        }
    }
}

/// Time source for staleness decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// What a view needs to render one query.
#[derive(Debug)]
pub struct QueryState<T> {
    pub data: Option<Arc<T>>,
    pub error: Option<ApiError>,
    /// First fetch of a key that has neither data nor an error yet.
    pub is_loading: bool,
    /// Any fetch in flight, background refetches included.
    pub is_fetching: bool,
    /// The most recent fetch failed. Cleared by the next success.
    pub is_error: bool,
    pub is_stale: bool,
    /// Time of the last successful fetch.
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            is_loading: false,
            is_fetching: false,
            is_error: false,
            is_stale: false,
            updated_at: None,
        }
    }
}

impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            error: self.error.clone(),
            is_loading: self.is_loading,
            is_fetching: self.is_fetching,
            is_error: self.is_error,
            is_stale: self.is_stale,
            updated_at: self.updated_at,
        }
    }
}

impl<T> QueryState<T> {
    /// State of a query that is not allowed to run.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_success(&self) -> bool {
        self.data.is_some() && !self.is_error
    }
}

type Erased = Arc<dyn Any + Send + Sync>;
type Waiter = oneshot::Sender<Result<Erased>>;

#[derive(Default)]
struct Entry {
    data: Option<Erased>,
    error: Option<ApiError>,
    updated_at: Option<DateTime<Utc>>,
    epoch: u64,
    fetched_epoch: Option<u64>,
    in_flight: Option<InFlight>,
    waiters: Vec<Waiter>,
    last_read: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy)]
struct InFlight {
    id: u64,
    epoch: u64,
}

impl Entry {
    fn is_fresh(&self, policy: StalePolicy, now: DateTime<Utc>) -> bool {
        match (&self.data, self.updated_at) {
            (Some(_), Some(updated_at)) => {
                self.error.is_none()
                    && self.fetched_epoch == Some(self.epoch)
                    && policy.is_fresh(updated_at, now)
            }
            _ => false,
        }
    }

    fn is_idle(&self, cutoff: DateTime<Utc>) -> bool {
        self.in_flight.is_none()
            && self.waiters.is_empty()
            && self.last_read.is_some_and(|read| read < cutoff)
    }
}

enum Plan {
    Cached(Erased),
    Wait(oneshot::Receiver<Result<Erased>>),
    Run(InFlight),
}

struct CacheInner {
    clock: Arc<dyn Clock>,
    idle_timeout: Duration,
    entries: Mutex<HashMap<QueryKey, Entry>>,
    next_fetch: AtomicU64,
    listeners: Listeners<QueryKey>,
}

/// Process-wide query cache. Clones share the same entries.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.len())
            .finish()
    }
}

fn downcast<T: Send + Sync + 'static>(value: Erased, key: &QueryKey) -> Result<Arc<T>> {
    value
        .downcast::<T>()
        .map_err(|_| ApiError::Internal(format!("Cached value for {} has an unexpected type", key)))
}

impl QueryCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                clock,
                idle_timeout: DEFAULT_IDLE_TIMEOUT,
                entries: Mutex::new(HashMap::new()),
                next_fetch: AtomicU64::new(1),
                listeners: Listeners::new(),
            }),
        }
    }

    /// Replace the idle eviction window.
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.idle_timeout = timeout;
        }
        self
    }

    /// Read `key`, fetching when the entry is missing or stale.
    ///
    /// With `force` the entry is refetched even when fresh. Concurrent callers
    /// for the same key share one request.
    pub async fn fetch<T, F, Fut>(
        &self,
        key: &QueryKey,
        policy: StalePolicy,
        force: bool,
        fetcher: F,
    ) -> Result<Arc<T>>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let plan = self.plan(key, policy, force);
        let flight = match plan {
            Plan::Cached(value) => {
                debug!(key = %key, "Query cache hit");
                return downcast(value, key);
            }
            Plan::Wait(receiver) => {
                debug!(key = %key, "Joining in-flight query");
                let value = receiver
                    .await
                    .map_err(|_| ApiError::Internal(format!("Fetch for {} was abandoned", key)))??;
                return downcast(value, key);
            }
            Plan::Run(flight) => flight,
        };

        debug!(key = %key, "Fetching query");
        self.inner.listeners.emit(key);

        let mut guard = FlightGuard {
            cache: self,
            key,
            flight,
            settled: false,
        };
        let result = fetcher().await.map(Arc::new);
        guard.settled = true;
        self.settle(key, flight, &result);
        self.inner.listeners.emit(key);
        result
    }

    /// Release a flight whose future was dropped before it finished. Joined
    /// callers see an abandoned fetch and the next read starts a new one.
    fn abandon(&self, key: &QueryKey, flight: InFlight) {
        let released = {
            let mut entries = self.inner.entries.lock();
            match entries.get_mut(key) {
                Some(entry) if entry.in_flight.map(|f| f.id) == Some(flight.id) => {
                    entry.in_flight = None;
                    entry.waiters.clear();
                    true
                }
                _ => false,
            }
        };
        if released {
            debug!(key = %key, "Query fetch abandoned");
            self.inner.listeners.emit(key);
        }
    }

    /// Drop entries unread since the idle cutoff, except `reading`.
    fn evict_idle(
        &self,
        entries: &mut HashMap<QueryKey, Entry>,
        reading: &QueryKey,
        now: DateTime<Utc>,
    ) {
        let cutoff = now - self.inner.idle_timeout;
        let before = entries.len();
        entries.retain(|key, entry| key == reading || !entry.is_idle(cutoff));
        let evicted = before - entries.len();
        if evicted > 0 {
            debug!(evicted, "Evicted idle queries");
        }
    }

    fn plan(&self, key: &QueryKey, policy: StalePolicy, force: bool) -> Plan {
        let now = self.inner.clock.now();
        let mut entries = self.inner.entries.lock();
        self.evict_idle(&mut entries, key, now);
        let entry = entries.entry(key.clone()).or_default();
        entry.last_read = Some(now);

        if !force && entry.is_fresh(policy, now) {
            if let Some(data) = &entry.data {
                return Plan::Cached(Arc::clone(data));
            }
        }

        if let Some(flight) = entry.in_flight {
            if flight.epoch == entry.epoch {
                let (sender, receiver) = oneshot::channel();
                entry.waiters.push(sender);
                return Plan::Wait(receiver);
            }
        }

        let flight = InFlight {
            id: self.inner.next_fetch.fetch_add(1, Ordering::Relaxed),
            epoch: entry.epoch,
        };
        entry.in_flight = Some(flight);
        Plan::Run(flight)
    }

    fn settle<T: Send + Sync + 'static>(
        &self,
        key: &QueryKey,
        flight: InFlight,
        result: &Result<Arc<T>>,
    ) {
        let now = self.inner.clock.now();
        let waiters = {
            let mut entries = self.inner.entries.lock();
            let Some(entry) = entries.get_mut(key) else {
                return;
            };
            // Superseded by a later fetch, or the cache was cleared.
            if entry.in_flight.map(|f| f.id) != Some(flight.id) {
                return;
            }
            entry.in_flight = None;
            entry.fetched_epoch = Some(flight.epoch);
            match result {
                Ok(value) => {
                    let erased: Erased = value.clone();
                    entry.data = Some(erased);
                    entry.error = None;
                    entry.updated_at = Some(now);
                }
                Err(err) => {
                    warn!(key = %key, "Query failed: {}", err);
                    entry.error = Some(err.clone());
                }
            }
            std::mem::take(&mut entry.waiters)
        };

        for waiter in waiters {
            let shared = match result {
                Ok(value) => {
                    let erased: Erased = value.clone();
                    Ok(erased)
                }
                Err(err) => Err(err.clone()),
            };
            let _ = waiter.send(shared);
        }
    }

    /// Current state of `key` without fetching.
    pub fn peek<T: Send + Sync + 'static>(&self, key: &QueryKey, policy: StalePolicy) -> QueryState<T> {
        let now = self.inner.clock.now();
        let mut entries = self.inner.entries.lock();
        let Some(entry) = entries.get_mut(key) else {
            return QueryState {
                is_stale: true,
                ..QueryState::default()
            };
        };

        let data = entry
            .data
            .as_ref()
            .and_then(|value| Arc::clone(value).downcast::<T>().ok());
        entry.last_read = Some(now);
        let is_fetching = entry.in_flight.is_some();
        QueryState {
            is_loading: is_fetching && data.is_none() && entry.error.is_none(),
            is_fetching,
            is_error: entry.error.is_some(),
            is_stale: !entry.is_fresh(policy, now),
            error: entry.error.clone(),
            updated_at: entry.updated_at,
            data,
        }
    }

    /// Mark every entry under `prefix` stale. Returns how many matched.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let touched: Vec<QueryKey> = {
            let mut entries = self.inner.entries.lock();
            entries
                .iter_mut()
                .filter(|(key, _)| key.starts_with(prefix))
                .map(|(key, entry)| {
                    entry.epoch += 1;
                    key.clone()
                })
                .collect()
        };
        debug!(prefix = %prefix, matched = touched.len(), "Invalidated queries");
        for key in &touched {
            self.inner.listeners.emit(key);
        }
        touched.len()
    }

    /// Run a write; on success invalidate `affected`. Failures leave the
    /// cache untouched.
    pub async fn mutate<T, Fut>(&self, affected: &[QueryKey], write: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        let value = write.await?;
        for key in affected {
            self.invalidate(key);
        }
        Ok(value)
    }

    /// Drop every entry. Pending waiters see an abandoned fetch.
    pub fn clear(&self) {
        self.inner.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Be told which key changed whenever an entry's state moves.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&QueryKey) + Send + Sync + 'static,
    {
        self.inner.listeners.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.listeners.unsubscribe(id)
    }
}

/// Releases the flight if the fetching future is dropped mid-request.
struct FlightGuard<'a> {
    cache: &'a QueryCache,
    key: &'a QueryKey,
    flight: InFlight,
    settled: bool,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.cache.abandon(self.key, self.flight);
        }
    }
}

type Fetcher<T> = Arc<dyn Fn() -> LocalBoxFuture<'static, Result<T>> + Send + Sync>;

/// A read bound to one key and fetch function.
///
/// A query built without a key is disabled: it never fetches and always
/// reports [`QueryState::disabled`].
pub struct Query<T> {
    cache: QueryCache,
    key: Option<QueryKey>,
    policy: StalePolicy,
    fetcher: Option<Fetcher<T>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Query<T> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            key: self.key.clone(),
            policy: self.policy,
            fetcher: self.fetcher.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Send + Sync + 'static> Query<T> {
    pub fn new<F>(cache: QueryCache, key: QueryKey, policy: StalePolicy, fetcher: F) -> Self
    where
        F: Fn() -> LocalBoxFuture<'static, Result<T>> + Send + Sync + 'static,
    {
        Self {
            cache,
            key: Some(key),
            policy,
            fetcher: Some(Arc::new(fetcher)),
            _marker: PhantomData,
        }
    }

    pub fn disabled(cache: QueryCache, policy: StalePolicy) -> Self {
        Self {
            cache,
            key: None,
            policy,
            fetcher: None,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> Option<&QueryKey> {
        self.key.as_ref()
    }

    pub fn is_enabled(&self) -> bool {
        self.key.is_some()
    }

    pub fn policy(&self) -> StalePolicy {
        self.policy
    }

    pub fn state(&self) -> QueryState<T> {
        match &self.key {
            Some(key) => self.cache.peek(key, self.policy),
            None => QueryState::disabled(),
        }
    }

    /// Fetch if missing or stale, then report the state.
    pub async fn load(&self) -> QueryState<T> {
        self.run(false).await
    }

    /// Fetch regardless of freshness, then report the state.
    pub async fn refetch(&self) -> QueryState<T> {
        self.run(true).await
    }

    async fn run(&self, force: bool) -> QueryState<T> {
        let (Some(key), Some(fetcher)) = (&self.key, &self.fetcher) else {
            return QueryState::disabled();
        };
        // The outcome is recorded in the cache entry; read it back from there.
        let _ = self
            .cache
            .fetch(key, self.policy, force, || fetcher())
            .await;
        self.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::sync::atomic::AtomicUsize;

    fn counting_query(
        cache: &QueryCache,
        key: QueryKey,
        policy: StalePolicy,
        calls: Arc<AtomicUsize>,
    ) -> Query<u32> {
        Query::new(cache.clone(), key, policy, move || {
            let calls = Arc::clone(&calls);
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                Ok::<u32, ApiError>(n as u32)
            }
            .boxed_local()
        })
    }

    #[test]
    fn test_key_prefix_matching() {
        let key = QueryKey::new("claim-summary").with("C1");
        assert!(key.starts_with(&QueryKey::new("claim-summary")));
        assert!(key.starts_with(&QueryKey::new("claim-summary").with("C1")));
        assert!(!key.starts_with(&QueryKey::new("claim-summary").with("C2")));
        assert_eq!(key.to_string(), "[claim-summary, C1]");
    }

    #[tokio::test]
    async fn test_fresh_entry_is_served_from_cache() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let query = counting_query(&cache, QueryKey::new("list"), StalePolicy::Manual, calls.clone());

        let first = query.load().await;
        assert_eq!(first.data.as_deref(), Some(&1));
        let second = query.load().await;
        assert_eq!(second.data.as_deref(), Some(&1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let forced = query.refetch().await;
        assert_eq!(forced.data.as_deref(), Some(&2));
    }

    #[tokio::test]
    async fn test_stale_window_expires() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache = QueryCache::with_clock(clock.clone());
        let calls = Arc::new(AtomicUsize::new(0));
        let query = counting_query(&cache, QueryKey::new("chat"), StalePolicy::seconds(5), calls.clone());

        query.load().await;
        clock.advance(Duration::seconds(4));
        query.load().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        clock.advance(Duration::seconds(2));
        assert!(query.state().is_stale);
        query.load().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_reads_coalesce() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let (release, gate) = oneshot::channel::<()>();

        let key = QueryKey::new("summary").with("C1");
        let slow = {
            let calls = Arc::clone(&calls);
            cache.fetch(&key, StalePolicy::Manual, false, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                let _ = gate.await;
                Ok(7u32)
            })
        };
        let joined = cache.fetch(&key, StalePolicy::Manual, false, || async {
            Ok::<u32, ApiError>(99)
        });
        let opener = async move {
            let _ = release.send(());
        };

        let (a, b, _) = futures::join!(slow, joined, opener);
        assert_eq!(*a.unwrap(), 7);
        assert_eq!(*b.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidation_during_flight_forces_refetch() {
        let cache = QueryCache::new();
        let key = QueryKey::new("claim-summary").with("C1");
        let (release, gate) = oneshot::channel::<()>();

        let in_flight = cache.fetch(&key, StalePolicy::Manual, false, move || async move {
            let _ = gate.await;
            Ok(1u32)
        });
        let invalidate = async {
            cache.invalidate(&QueryKey::new("claim-summary").with("C1"));
            let _ = release.send(());
        };
        let (first, _) = futures::join!(in_flight, invalidate);
        assert_eq!(*first.unwrap(), 1);

        let state = cache.peek::<u32>(&key, StalePolicy::Manual);
        assert_eq!(state.data.as_deref(), Some(&1));
        assert!(state.is_stale);

        let second = cache
            .fetch(&key, StalePolicy::Manual, false, || async { Ok(2u32) })
            .await
            .unwrap();
        assert_eq!(*second, 2);
    }

    #[tokio::test]
    async fn test_dropped_fetch_releases_its_key() {
        let cache = QueryCache::new();
        let key = QueryKey::new("high-risk-claims").with("page=1");

        let mut leader = Box::pin(cache.fetch(&key, StalePolicy::Manual, false, || {
            futures::future::pending::<Result<u32>>()
        }));
        assert!(futures::poll!(leader.as_mut()).is_pending());
        let mut joined = Box::pin(cache.fetch(&key, StalePolicy::Manual, false, || async {
            Ok(9u32)
        }));
        assert!(futures::poll!(joined.as_mut()).is_pending());
        assert!(cache.peek::<u32>(&key, StalePolicy::Manual).is_fetching);

        drop(leader);
        let state = cache.peek::<u32>(&key, StalePolicy::Manual);
        assert!(!state.is_fetching);
        assert!(!state.is_loading);
        assert!(matches!(joined.await, Err(ApiError::Internal(_))));

        let value = cache
            .fetch(&key, StalePolicy::Manual, true, || async { Ok(3u32) })
            .await
            .unwrap();
        assert_eq!(*value, 3);
        assert_eq!(
            cache.peek::<u32>(&key, StalePolicy::Manual).data.as_deref(),
            Some(&3)
        );
    }

    #[tokio::test]
    async fn test_unread_entries_are_evicted() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache = QueryCache::with_clock(clock.clone());
        let watched = QueryKey::new("high-risk-claims").with("page=1");
        let abandoned = QueryKey::new("high-risk-claims").with("page=2");

        for key in [&watched, &abandoned] {
            cache
                .fetch(key, StalePolicy::Manual, false, || async { Ok(1u32) })
                .await
                .unwrap();
        }

        clock.advance(Duration::minutes(4));
        cache.peek::<u32>(&watched, StalePolicy::Manual);
        clock.advance(Duration::minutes(2));
        cache
            .fetch(&QueryKey::new("reports"), StalePolicy::Manual, false, || async {
                Ok(2u32)
            })
            .await
            .unwrap();

        assert_eq!(cache.len(), 2);
        assert!(cache.peek::<u32>(&watched, StalePolicy::Manual).data.is_some());
        assert!(cache.peek::<u32>(&abandoned, StalePolicy::Manual).data.is_none());
    }

    #[tokio::test]
    async fn test_idle_timeout_is_configurable() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache = QueryCache::with_clock(clock.clone()).with_idle_timeout(Duration::seconds(30));
        let key = QueryKey::new("chat").with("C1");
        cache
            .fetch(&key, StalePolicy::Manual, false, || async { Ok(1u32) })
            .await
            .unwrap();

        clock.advance(Duration::seconds(31));
        cache
            .fetch(&QueryKey::new("chat").with("C2"), StalePolicy::Manual, false, || async {
                Ok(2u32)
            })
            .await
            .unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_error_keeps_previous_data_until_success() {
        let cache = QueryCache::new();
        let key = QueryKey::new("reports");

        cache
            .fetch(&key, StalePolicy::Manual, false, || async { Ok(5u32) })
            .await
            .unwrap();
        let err = cache
            .fetch(&key, StalePolicy::Manual, true, || async {
                Err::<u32, _>(ApiError::Network("down".to_string()))
            })
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::Network("down".to_string()));

        let state = cache.peek::<u32>(&key, StalePolicy::Manual);
        assert!(state.is_error);
        assert!(!state.is_loading);
        assert_eq!(state.data.as_deref(), Some(&5));

        cache
            .fetch(&key, StalePolicy::Manual, false, || async { Ok(6u32) })
            .await
            .unwrap();
        let state = cache.peek::<u32>(&key, StalePolicy::Manual);
        assert!(!state.is_error);
        assert!(state.error.is_none());
        assert_eq!(state.data.as_deref(), Some(&6));
    }

    #[tokio::test]
    async fn test_disabled_query_never_fetches() {
        let cache = QueryCache::new();
        let query: Query<u32> = Query::disabled(cache.clone(), StalePolicy::Manual);
        let state = query.load().await;
        assert!(state.data.is_none());
        assert!(!state.is_loading);
        assert!(!state.is_error);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_mutation_failure_leaves_cache_untouched() {
        let cache = QueryCache::new();
        let key = QueryKey::new("claim-summary").with("C1");
        cache
            .fetch(&key, StalePolicy::Manual, false, || async { Ok(1u32) })
            .await
            .unwrap();

        let result: Result<()> = cache
            .mutate(&[key.clone()], async {
                Err(ApiError::Status {
                    status: 500,
                    message: "boom".to_string(),
                })
            })
            .await;
        assert!(result.is_err());
        assert!(!cache.peek::<u32>(&key, StalePolicy::Manual).is_stale);

        cache.mutate(&[key.clone()], async { Ok(()) }).await.unwrap();
        assert!(cache.peek::<u32>(&key, StalePolicy::Manual).is_stale);
    }

    #[tokio::test]
    async fn test_subscribers_receive_changed_keys() {
        let cache = QueryCache::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        cache.subscribe(move |key| sink.lock().push(key.to_string()));

        let key = QueryKey::new("chat").with("C1");
        cache
            .fetch(&key, StalePolicy::Manual, false, || async { Ok(1u32) })
            .await
            .unwrap();
        cache.invalidate(&QueryKey::new("chat"));

        assert_eq!(
            *seen.lock(),
            vec!["[chat, C1]".to_string(), "[chat, C1]".to_string(), "[chat, C1]".to_string()]
        );
    }
}
