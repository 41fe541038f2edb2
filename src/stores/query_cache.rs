/// Keyed async query cache
///
/// Memoizes the result of an async producer per query key and publishes the
/// entry's [`DataState`] to any number of observers through a watch channel.
///
/// # Guarantees
/// - At most one producer runs per key at a time; observers that attach while
///   a fetch is in flight share it instead of starting their own
/// - With [`StaleTime::Never`] (the default) a loaded value is reused forever
/// - Dropping an unfinished [`FetchTask`] releases the key so that the next
///   observer can fetch again, instead of leaving the entry stuck in Loading
/// - Nothing is written back once the cache has been disposed
///
/// The cache is single-threaded (`Rc<RefCell<_>>`): every write happens from
/// a fetch task or an explicit call on the UI event loop, and no borrow is held
/// across an `.await`.

use futures::future::LocalBoxFuture;
use futures::FutureExt;
use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::watch;

use crate::stores::errors::FetchError;
use crate::utils::time::Instant;
use crate::utils::DataState;

/// Static identifier of a cached query
pub type QueryKey = &'static str;

/// What observers of a query see
pub type QueryState<T> = DataState<T, FetchError>;

/// How long a loaded value stays fresh
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StaleTime {
    /// Loaded values are never refetched implicitly
    Never,
    /// A value older than this is refetched by the next observer
    After(Duration),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CacheConfig {
    pub stale_time: StaleTime,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time: StaleTime::Never,
        }
    }
}

struct Entry<T> {
    state: watch::Sender<QueryState<T>>,
    in_flight: bool,
    fetch_count: u32,
    loaded_at: Option<Instant>,
}

impl<T> Entry<T> {
    fn new() -> Self {
        let (state, _) = watch::channel(DataState::default());
        Self {
            state,
            in_flight: false,
            fetch_count: 0,
            loaded_at: None,
        }
    }

    fn is_stale(&self, stale_time: StaleTime) -> bool {
        match stale_time {
            StaleTime::Never => false,
            StaleTime::After(max_age) => self
                .loaded_at
                .map_or(true, |loaded_at| loaded_at.elapsed() >= max_age),
        }
    }

    /// Whether a new observer should kick off a fetch
    fn wants_fetch(&self, stale_time: StaleTime) -> bool {
        if self.in_flight {
            return false;
        }
        let state = self.state.borrow();
        if state.is_pending() || state.is_loading() {
            return true;
        }
        // Failed entries wait for an explicit refetch
        !state.is_error() && self.is_stale(stale_time)
    }
}

struct CacheInner<T> {
    config: CacheConfig,
    entries: HashMap<QueryKey, Entry<T>>,
    disposed: bool,
}

/// Handle to a query cache; clones share the same entries
pub struct QueryCache<T> {
    inner: Rc<RefCell<CacheInner<T>>>,
}

impl<T> Clone for QueryCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

/// A live view of one query
pub struct QueryObserver<T> {
    /// Current state; `changed()` resolves on every update
    pub state: watch::Receiver<QueryState<T>>,
    /// Present only if this observer started a fetch; the caller must drive it
    pub task: Option<FetchTask>,
}

/// A pending producer invocation that writes its result into the cache
#[must_use = "a fetch task does nothing unless it is spawned or awaited"]
pub struct FetchTask {
    future: LocalBoxFuture<'static, ()>,
}

impl Future for FetchTask {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        self.future.as_mut().poll(cx)
    }
}

impl<T: Clone + 'static> QueryCache<T> {
    pub fn create(config: CacheConfig) -> Self {
        log::debug!("Creating query cache ({:?})", config.stale_time);
        Self {
            inner: Rc::new(RefCell::new(CacheInner {
                config,
                entries: HashMap::new(),
                disposed: false,
            })),
        }
    }

    /// Observe `key`, starting `producer` if the entry needs a value
    pub fn query<F, Fut>(&self, key: QueryKey, producer: F) -> QueryObserver<T>
    where
        F: FnOnce() -> Fut + 'static,
        Fut: Future<Output = Result<T, FetchError>> + 'static,
    {
        let weak = Rc::downgrade(&self.inner);
        let mut inner = self.inner.borrow_mut();

        if inner.disposed {
            log::warn!("Query '{}' observed after cache disposal", key);
            let (_, state) = watch::channel(DataState::default());
            return QueryObserver { state, task: None };
        }

        let stale_time = inner.config.stale_time;
        let entry = inner.entries.entry(key).or_insert_with(Entry::new);
        let state = entry.state.subscribe();

        let task = if entry.wants_fetch(stale_time) {
            Some(Self::begin(entry, weak, key, producer))
        } else {
            log::debug!("Query '{}' served from cache", key);
            None
        };

        QueryObserver { state, task }
    }

    /// Fetch `key` again regardless of freshness
    ///
    /// Returns `None` while a fetch for the key is already running.
    pub fn refetch<F, Fut>(&self, key: QueryKey, producer: F) -> Option<FetchTask>
    where
        F: FnOnce() -> Fut + 'static,
        Fut: Future<Output = Result<T, FetchError>> + 'static,
    {
        let weak = Rc::downgrade(&self.inner);
        let mut inner = self.inner.borrow_mut();
        if inner.disposed {
            return None;
        }

        let entry = inner.entries.entry(key).or_insert_with(Entry::new);
        if entry.in_flight {
            log::debug!("Refetch of '{}' ignored, fetch already in flight", key);
            return None;
        }

        Some(Self::begin(entry, weak, key, producer))
    }

    /// Snapshot of the entry for `key`, if one exists
    pub fn state(&self, key: QueryKey) -> Option<QueryState<T>> {
        self.inner
            .borrow()
            .entries
            .get(key)
            .map(|entry| entry.state.borrow().clone())
    }

    /// How many fetches have been started for `key`
    pub fn fetch_count(&self, key: QueryKey) -> u32 {
        self.inner
            .borrow()
            .entries
            .get(key)
            .map_or(0, |entry| entry.fetch_count)
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.borrow().disposed
    }

    /// Drop every entry; later fetch results are discarded
    pub fn dispose(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.disposed {
            return;
        }
        log::info!("Disposing query cache ({} entries)", inner.entries.len());
        inner.disposed = true;
        inner.entries.clear();
    }

    fn begin<F, Fut>(
        entry: &mut Entry<T>,
        cache: Weak<RefCell<CacheInner<T>>>,
        key: QueryKey,
        producer: F,
    ) -> FetchTask
    where
        F: FnOnce() -> Fut + 'static,
        Fut: Future<Output = Result<T, FetchError>> + 'static,
    {
        entry.in_flight = true;
        entry.fetch_count += 1;
        log::info!("Fetching query '{}' (attempt {})", key, entry.fetch_count);

        // A stale value stays visible while it is being refreshed
        let has_value = entry.state.borrow().is_loaded();
        if !has_value {
            entry.state.send_replace(DataState::Loading);
        }

        let mut claim = InFlight {
            cache,
            key,
            settled: false,
        };

        FetchTask {
            future: async move {
                let result = producer().await;
                claim.settle(result);
            }
            .boxed_local(),
        }
    }
}

/// The in-flight claim on one key, released on completion or drop
struct InFlight<T> {
    cache: Weak<RefCell<CacheInner<T>>>,
    key: QueryKey,
    settled: bool,
}

impl<T> InFlight<T> {
    fn settle(&mut self, result: Result<T, FetchError>) {
        self.settled = true;

        let Some(cache) = self.cache.upgrade() else {
            log::debug!("Query '{}' finished after its cache was dropped", self.key);
            return;
        };
        let mut inner = cache.borrow_mut();
        if inner.disposed {
            log::debug!("Discarding result for '{}', cache disposed", self.key);
            return;
        }
        let Some(entry) = inner.entries.get_mut(self.key) else {
            return;
        };

        entry.in_flight = false;
        match &result {
            Ok(_) => {
                log::info!("Query '{}' loaded", self.key);
                entry.loaded_at = Some(Instant::now());
            }
            Err(err) => log::warn!("Query '{}' failed: {}", self.key, err),
        }
        entry.state.send_replace(DataState::from(result));
    }
}

impl<T> Drop for InFlight<T> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let Some(cache) = self.cache.upgrade() else {
            return;
        };
        let Ok(mut inner) = cache.try_borrow_mut() else {
            return;
        };
        if let Some(entry) = inner.entries.get_mut(self.key) {
            if entry.in_flight {
                log::debug!("Fetch for '{}' cancelled", self.key);
                entry.in_flight = false;
                // a refreshing value stays; an unanswered first fetch resets
                let unanswered = entry.state.borrow().is_loading();
                if unanswered {
                    entry.state.send_replace(DataState::Pending);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::profile_source::{ProfileSource, StubProfileSource};
    use crate::stores::profiles::Profile;

    const KEY: QueryKey = "user-profile";

    fn fetch_with(
        source: &Rc<StubProfileSource>,
    ) -> impl FnOnce() -> LocalBoxFuture<'static, Result<Profile, FetchError>> {
        let source = Rc::clone(source);
        move || async move { source.fetch_profile().await }.boxed_local()
    }

    fn failing(
        err: FetchError,
    ) -> impl FnOnce() -> LocalBoxFuture<'static, Result<Profile, FetchError>> {
        move || async move { Err(err) }.boxed_local()
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_observer_starts_fetch_and_sees_loading() {
        let cache = QueryCache::create(CacheConfig::default());
        let source = Rc::new(StubProfileSource::new());

        let observer = cache.query(KEY, fetch_with(&source));
        assert!(observer.task.is_some());
        assert!(observer.state.borrow().is_loading());
        assert!(observer.state.borrow().data().is_none());

        observer.task.unwrap().await;
        assert_eq!(observer.state.borrow().data(), Some(&Profile::demo()));
        assert!(!observer.state.borrow().is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_observers_share_one_fetch() {
        let cache = QueryCache::create(CacheConfig::default());
        let source = Rc::new(StubProfileSource::new());

        let first = cache.query(KEY, fetch_with(&source));
        let second = cache.query(KEY, fetch_with(&source));
        let third = cache.query(KEY, fetch_with(&source));
        assert!(second.task.is_none());
        assert!(third.task.is_none());
        assert!(second.state.borrow().is_loading());

        first.task.unwrap().await;

        assert_eq!(source.calls(), 1);
        assert_eq!(cache.fetch_count(KEY), 1);
        assert!(second.state.borrow().is_loaded());
        assert!(third.state.borrow().is_loaded());
    }

    #[tokio::test(start_paused = true)]
    async fn test_observer_is_notified_on_resolution() {
        let cache = QueryCache::create(CacheConfig::default());
        let source = Rc::new(StubProfileSource::new());

        let first = cache.query(KEY, fetch_with(&source));
        let mut late = cache.query(KEY, fetch_with(&source)).state;
        late.borrow_and_update();

        let (_, changed) = tokio::join!(first.task.unwrap(), late.changed());
        assert!(changed.is_ok());
        assert!(late.borrow().is_loaded());
    }

    #[tokio::test(start_paused = true)]
    async fn test_loaded_value_never_goes_stale_by_default() {
        let cache = QueryCache::create(CacheConfig::default());
        let source = Rc::new(StubProfileSource::new());

        cache.query(KEY, fetch_with(&source)).task.unwrap().await;
        tokio::time::sleep(Duration::from_secs(3600)).await;

        let again = cache.query(KEY, fetch_with(&source));
        assert!(again.task.is_none());
        assert!(again.state.borrow().is_loaded());
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_value_is_refreshed_in_background() {
        let cache = QueryCache::create(CacheConfig {
            stale_time: StaleTime::After(Duration::ZERO),
        });
        let source = Rc::new(StubProfileSource::with_delay(Duration::from_millis(10)));

        cache.query(KEY, fetch_with(&source)).task.unwrap().await;

        let again = cache.query(KEY, fetch_with(&source));
        // old value stays visible during the refresh
        assert!(again.state.borrow().is_loaded());
        again.task.expect("stale entry refetches").await;
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_published_and_refetch_recovers() {
        let cache = QueryCache::create(CacheConfig::default());
        let source = Rc::new(StubProfileSource::with_delay(Duration::from_millis(10)));

        let observer = cache.query(KEY, failing(FetchError::Timeout));
        observer.task.unwrap().await;
        {
            let state = observer.state.borrow();
            assert_eq!(state.error(), Some(&FetchError::Timeout));
            assert!(state.data().is_none());
            assert!(!state.is_loading());
        }

        // errors are not retried implicitly
        assert!(cache.query(KEY, fetch_with(&source)).task.is_none());

        let retry = cache.refetch(KEY, fetch_with(&source)).unwrap();
        assert!(observer.state.borrow().is_loading());
        retry.await;
        assert!(observer.state.borrow().is_loaded());
        assert_eq!(cache.fetch_count(KEY), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refetch_is_refused_while_in_flight() {
        let cache = QueryCache::create(CacheConfig::default());
        let source = Rc::new(StubProfileSource::new());

        let observer = cache.query(KEY, fetch_with(&source));
        assert!(cache.refetch(KEY, fetch_with(&source)).is_none());
        observer.task.unwrap().await;
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_task_releases_key() {
        let cache = QueryCache::create(CacheConfig::default());
        let source = Rc::new(StubProfileSource::new());

        let observer = cache.query(KEY, fetch_with(&source));
        let task = observer.task.unwrap();
        // unmounted half way through the delay
        let timed_out = tokio::time::timeout(Duration::from_millis(1000), task).await;
        assert!(timed_out.is_err());
        assert_eq!(source.calls(), 1);
        assert!(cache.state(KEY).unwrap().is_pending());

        let remount = cache.query(KEY, fetch_with(&source));
        remount.task.expect("released key fetches again").await;
        assert_eq!(source.calls(), 2);
        assert!(remount.state.borrow().is_loaded());
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_after_dispose_is_discarded() {
        let cache = QueryCache::create(CacheConfig::default());
        let source = Rc::new(StubProfileSource::new());

        let observer = cache.query(KEY, fetch_with(&source));
        cache.dispose();
        assert!(cache.is_disposed());

        observer.task.unwrap().await;
        assert!(cache.state(KEY).is_none());
        assert!(observer.state.borrow().is_loading());

        let late = cache.query(KEY, fetch_with(&source));
        assert!(late.task.is_none());
        assert!(late.state.borrow().is_pending());
        assert!(cache.refetch(KEY, fetch_with(&source)).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_independent() {
        let cache = QueryCache::create(CacheConfig::default());
        let source = Rc::new(StubProfileSource::with_delay(Duration::from_millis(10)));

        let a = cache.query("a", fetch_with(&source));
        let b = cache.query("b", fetch_with(&source));
        assert!(a.task.is_some());
        assert!(b.task.is_some());
        tokio::join!(a.task.unwrap(), b.task.unwrap());
        assert_eq!(source.calls(), 2);
        assert_eq!(cache.fetch_count("a"), 1);
        assert_eq!(cache.fetch_count("missing"), 0);
    }
}
