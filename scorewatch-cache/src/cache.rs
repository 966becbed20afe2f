//! Time-bounded cache around an asynchronous producer.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use scorewatch_core::error::Result;

/// Boxed zero-argument producer of a fresh value.
pub type FetchFn<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T>> + Send + Sync>;

type InFlight<T> = Shared<BoxFuture<'static, Result<T>>>;

/// Value with its expiry.
struct Cached<T> {
    data: T,
    expires_at: Instant,
}

impl<T> Cached<T> {
    fn is_fresh(&self) -> bool {
        self.expires_at > Instant::now()
    }
}

/// Everything guarded by the cache mutex.
///
/// The mutex is never held across an await.
struct CacheState<T> {
    value: Option<Cached<T>>,
    /// Pending fetch, tagged with the generation that started it
    in_flight: Option<(u64, InFlight<T>)>,
    generation: u64,
}

struct Inner<T> {
    fetch: FetchFn<T>,
    ttl: Duration,
    state: Mutex<CacheState<T>>,
    fetches: AtomicU64,
    hits: AtomicU64,
    failures: AtomicU64,
}

/// Single-flight TTL cache.
///
/// Serves the last fetched value while it is younger than `ttl`. On a miss (or a
/// forced refresh) exactly one fetch runs; every caller arriving while it is
/// pending awaits the same shared future and receives the same value or error.
/// A failed fetch caches nothing and clears the in-flight marker.
///
/// Clones share state, so a detached task can drive a refresh.
pub struct TtlCache<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for TtlCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> TtlCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a cache around `fetch` with the given time-to-live.
    ///
    /// A zero `ttl` never serves from cache but still deduplicates concurrent fetches.
    pub fn new<F, Fut>(ttl: Duration, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let fetch: FetchFn<T> = Arc::new(move || fetch().boxed());
        Self::from_fn(ttl, fetch)
    }

    /// Creates a cache from an already boxed producer.
    pub fn from_fn(ttl: Duration, fetch: FetchFn<T>) -> Self {
        Self {
            inner: Arc::new(Inner {
                fetch,
                ttl,
                state: Mutex::new(CacheState {
                    value: None,
                    in_flight: None,
                    generation: 0,
                }),
                fetches: AtomicU64::new(0),
                hits: AtomicU64::new(0),
                failures: AtomicU64::new(0),
            }),
        }
    }

    /// Returns a value at most `ttl` old, fetching if needed.
    ///
    /// With `force_refresh` the freshness check is skipped, but a fetch that is
    /// already pending is joined rather than duplicated.
    pub async fn get_value(&self, force_refresh: bool) -> Result<T> {
        let (generation, pending) = {
            let mut state = self.inner.state.lock();

            if !force_refresh {
                if let Some(cached) = state.value.as_ref().filter(|c| c.is_fresh()) {
                    self.inner.hits.fetch_add(1, Ordering::Relaxed);
                    return Ok(cached.data.clone());
                }
            }

            let joined = state
                .in_flight
                .as_ref()
                .map(|(generation, pending)| (*generation, pending.clone()));

            match joined {
                Some((generation, pending)) => {
                    debug!(generation, "Joining in-flight fetch");
                    (generation, pending)
                }
                None => {
                    state.generation += 1;
                    let generation = state.generation;
                    let pending = (self.inner.fetch)().shared();
                    state.in_flight = Some((generation, pending.clone()));
                    self.inner.fetches.fetch_add(1, Ordering::Relaxed);
                    debug!(generation, force_refresh, "Starting fetch");
                    (generation, pending)
                }
            }
        };

        let result = pending.await;
        self.settle(generation, &result);
        result
    }

    /// Returns a fresh-enough value (`get_value(false)`).
    pub async fn get(&self) -> Result<T> {
        self.get_value(false).await
    }

    /// Fetches regardless of freshness (`get_value(true)`).
    pub async fn refresh(&self) -> Result<T> {
        self.get_value(true).await
    }

    /// Starts a forced refresh on a detached task.
    ///
    /// Failures are logged; nobody awaits the result. Returns `None` when called
    /// outside a Tokio runtime, in which case nothing is started.
    pub fn spawn_refresh(&self) -> Option<JoinHandle<()>> {
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("No runtime available, background refresh skipped");
                return None;
            }
        };

        let cache = self.clone();
        Some(handle.spawn(async move {
            if let Err(err) = cache.refresh().await {
                warn!(error = %err, "Background refresh failed");
            }
        }))
    }

    /// Returns the cached value without fetching, even if it has expired.
    pub fn peek(&self) -> Option<T> {
        self.inner.state.lock().value.as_ref().map(|c| c.data.clone())
    }

    /// Drops the cached value. A pending fetch is left alone.
    pub fn invalidate(&self) {
        self.inner.state.lock().value = None;
    }

    /// Returns true while a fetch is pending.
    pub fn is_fetching(&self) -> bool {
        self.inner.state.lock().in_flight.is_some()
    }

    /// Returns true if a cached value exists and has not expired.
    pub fn is_fresh(&self) -> bool {
        self.inner
            .state
            .lock()
            .value
            .as_ref()
            .is_some_and(Cached::is_fresh)
    }

    /// Configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        let state = self.inner.state.lock();
        CacheStats {
            fetches: self.inner.fetches.load(Ordering::Relaxed),
            hits: self.inner.hits.load(Ordering::Relaxed),
            failures: self.inner.failures.load(Ordering::Relaxed),
            has_value: state.value.is_some(),
            in_flight: state.in_flight.is_some(),
        }
    }

    /// Records the outcome of the fetch tagged `generation`.
    ///
    /// Only the first waiter to get here for the current generation stores the
    /// value and clears the marker; later waiters find a different (or no) marker.
    fn settle(&self, generation: u64, result: &Result<T>) {
        let mut state = self.inner.state.lock();

        match &state.in_flight {
            Some((current, _)) if *current == generation => {}
            _ => return,
        }
        state.in_flight = None;

        match result {
            Ok(data) => {
                state.value = Some(Cached {
                    data: data.clone(),
                    expires_at: Instant::now() + self.inner.ttl,
                });
            }
            Err(err) => {
                self.inner.failures.fetch_add(1, Ordering::Relaxed);
                warn!(generation, error = %err, "Fetch failed, nothing cached");
            }
        }
    }
}

/// Cache statistics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheStats {
    /// Fetches started
    pub fetches: u64,
    /// Calls served from the cached value
    pub hits: u64,
    /// Fetches that failed
    pub failures: u64,
    /// Whether a value (fresh or not) is cached
    pub has_value: bool,
    /// Whether a fetch is pending
    pub in_flight: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use scorewatch_core::error::WatchError;

    const TTL: Duration = Duration::from_millis(100);
    const FETCH_LATENCY: Duration = Duration::from_millis(10);

    /// Producer returning 10, 20, 30... and counting its calls.
    fn counting_cache(ttl: Duration) -> (TtlCache<u64>, Arc<AtomicU64>) {
        let calls = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&calls);
        let cache = TtlCache::new(ttl, move || {
            let counter = Arc::clone(&counter);
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                tokio::time::sleep(FETCH_LATENCY).await;
                Ok(n * 10)
            }
        });
        (cache, calls)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_on_first_call() {
        let (cache, calls) = counting_cache(TTL);

        assert_eq!(cache.get().await.unwrap(), 10);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.is_fresh());
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_cached_value_within_ttl() {
        let (cache, calls) = counting_cache(TTL);
        cache.get().await.unwrap();

        tokio::time::advance(TTL - Duration::from_millis(1)).await;

        assert_eq!(cache.get().await.unwrap(), 10);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().hits, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refreshes_value_after_ttl() {
        let (cache, calls) = counting_cache(TTL);
        cache.get().await.unwrap();

        tokio::time::advance(TTL).await;
        assert!(!cache.is_fresh());

        assert_eq!(cache.get().await.unwrap(), 20);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_refresh_bypasses_freshness() {
        let (cache, calls) = counting_cache(TTL);
        cache.get().await.unwrap();

        assert_eq!(cache.get_value(true).await.unwrap(), 20);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.get().await.unwrap(), 20);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_calls_share_one_fetch() {
        let (cache, calls) = counting_cache(TTL);

        let results = futures::future::join_all((0..8).map(|_| cache.get())).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(results.into_iter().all(|r| r.unwrap() == 10));
        assert!(!cache.stats().in_flight);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_forced_calls_share_one_fetch() {
        let (cache, calls) = counting_cache(TTL);
        cache.get().await.unwrap();

        let (a, b) = tokio::join!(cache.get_value(true), cache.get_value(true));

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(a.unwrap(), 20);
        assert_eq!(b.unwrap(), 20);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_reaches_every_waiter_and_does_not_poison() {
        let calls = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&calls);
        let cache: TtlCache<u64> = TtlCache::new(TTL, move || {
            let counter = Arc::clone(&counter);
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                tokio::time::sleep(FETCH_LATENCY).await;
                if n == 1 {
                    Err(WatchError::fetch("/api/state", "connection refused"))
                } else {
                    Ok(n)
                }
            }
        });

        let (a, b, c) = tokio::join!(cache.get(), cache.get(), cache.get());
        let expected = WatchError::fetch("/api/state", "connection refused");
        assert_eq!(a.unwrap_err(), expected);
        assert_eq!(b.unwrap_err(), expected);
        assert_eq!(c.unwrap_err(), expected);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let stats = cache.stats();
        assert!(!stats.in_flight);
        assert!(!stats.has_value);
        assert_eq!(stats.failures, 1);

        assert_eq!(cache.get().await.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_ttl_refetches_but_deduplicates() {
        let (cache, calls) = counting_cache(Duration::ZERO);

        cache.get().await.unwrap();
        cache.get().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        let (a, b) = tokio::join!(cache.get(), cache.get());
        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_forces_next_fetch() {
        let (cache, calls) = counting_cache(TTL);
        cache.get().await.unwrap();

        cache.invalidate();
        assert!(cache.peek().is_none());

        assert_eq!(cache.get().await.unwrap(), 20);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_peek_returns_expired_value() {
        let (cache, _calls) = counting_cache(TTL);
        assert!(cache.peek().is_none());

        cache.get().await.unwrap();
        tokio::time::advance(TTL * 2).await;

        assert_eq!(cache.peek(), Some(10));
        assert!(!cache.is_fresh());
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_refresh_updates_shared_clone() {
        let (cache, calls) = counting_cache(TTL);
        cache.get().await.unwrap();

        cache.spawn_refresh().unwrap().await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.peek(), Some(20));
    }
}
