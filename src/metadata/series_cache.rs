//! Process-scoped, single-flight cache of series episode indexes.
//!
//! Many episodes of the same show resolve through one series lookup, and the
//! pipeline processes episodes concurrently. The cache guarantees at most one
//! upstream fetch per series id: concurrent callers for the same uncached id
//! coalesce onto a single in-flight fetch and all receive its outcome,
//! success or failure. Entries live for the whole run; series counts are
//! small and bounded by the catalog, so there is no eviction.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use super::provider::{ProviderError, RetryPolicy, SeriesProvider, SeriesRecord};

/// Shared outcome of one series lookup, delivered to every waiter.
pub type SeriesOutcome = Result<Arc<SeriesRecord>, Arc<ProviderError>>;

/// Single-flight cache keyed by provider series id.
pub struct SeriesCache {
    provider: Arc<dyn SeriesProvider>,
    locale: String,
    retry: RetryPolicy,
    entries: DashMap<u32, Arc<OnceCell<SeriesOutcome>>>,
}

impl SeriesCache {
    /// Create a cache backed by `provider`, fetching in the given locale.
    pub fn new(provider: Arc<dyn SeriesProvider>, locale: String, retry: RetryPolicy) -> Self {
        Self {
            provider,
            locale,
            retry,
            entries: DashMap::new(),
        }
    }

    /// Look up the episode index for `series_id`, fetching it upstream at
    /// most once per run.
    ///
    /// The map entry is claimed atomically and the per-key cell coalesces
    /// every concurrent caller onto one fetch; failure outcomes are cached
    /// for the run as well, so a series that could not be fetched is not
    /// hammered again by later episodes.
    pub async fn get(&self, series_id: u32) -> SeriesOutcome {
        let cell = self
            .entries
            .entry(series_id)
            .or_default()
            .clone();

        cell.get_or_init(|| self.fetch_with_retry(series_id))
            .await
            .clone()
    }

    /// Number of series looked up so far (cached successes and failures).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    async fn fetch_with_retry(&self, series_id: u32) -> SeriesOutcome {
        let mut attempt = 1;
        loop {
            match self.provider.fetch_series(series_id, &self.locale).await {
                Ok(record) => {
                    debug!(
                        series_id,
                        episodes = record.len(),
                        provider = self.provider.name(),
                        "Fetched series episode index"
                    );
                    return Ok(Arc::new(record));
                }
                Err(e) if e.is_transient() && attempt < self.retry.attempts => {
                    warn!(
                        series_id,
                        attempt,
                        error = %e,
                        "Series fetch failed, retrying"
                    );
                    tokio::time::sleep(self.retry.delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!(
                        series_id,
                        attempts = attempt,
                        error = %e,
                        "Series fetch failed, giving up for this run"
                    );
                    return Err(Arc::new(e));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Counting provider that can fail a configurable number of times first.
    struct CountingProvider {
        calls: AtomicU32,
        fail_first: u32,
        failure: fn(String) -> ProviderError,
    }

    impl CountingProvider {
        fn succeeding() -> Self {
            Self {
                calls: AtomicU32::new(0),
                fail_first: 0,
                failure: ProviderError::Transient,
            }
        }

        fn failing_first(n: u32, failure: fn(String) -> ProviderError) -> Self {
            Self {
                calls: AtomicU32::new(0),
                fail_first: n,
                failure,
            }
        }
    }

    #[async_trait]
    impl SeriesProvider for CountingProvider {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn fetch_series(
            &self,
            series_id: u32,
            _locale: &str,
        ) -> Result<SeriesRecord, ProviderError> {
            // Yield so concurrent callers can pile onto the in-flight fetch.
            tokio::time::sleep(Duration::from_millis(10)).await;
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.fail_first {
                return Err((self.failure)("induced failure".to_string()));
            }
            let mut episodes = HashMap::new();
            episodes.insert((1, 1), format!("tt{series_id}0101"));
            Ok(SeriesRecord::new(series_id, episodes))
        }
    }

    fn cache_with(provider: Arc<CountingProvider>, attempts: u32) -> SeriesCache {
        SeriesCache::new(
            provider,
            "en".to_string(),
            RetryPolicy {
                attempts,
                delay: Duration::from_millis(5),
            },
        )
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_fetch() {
        let provider = Arc::new(CountingProvider::succeeding());
        let cache = Arc::new(cache_with(provider.clone(), 3));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move { cache.get(100).await }));
        }
        for handle in handles {
            let outcome = handle.await.unwrap();
            assert!(outcome.is_ok());
        }

        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn distinct_series_fetch_independently() {
        let provider = Arc::new(CountingProvider::succeeding());
        let cache = cache_with(provider.clone(), 3);

        assert!(cache.get(1).await.is_ok());
        assert!(cache.get(2).await.is_ok());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn transient_failures_are_retried_then_succeed() {
        let provider = Arc::new(CountingProvider::failing_first(2, ProviderError::Transient));
        let cache = cache_with(provider.clone(), 3);

        let outcome = cache.get(7).await;
        assert!(outcome.is_ok());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausted_retries_yield_shared_failure() {
        let provider = Arc::new(CountingProvider::failing_first(99, ProviderError::Transient));
        let cache = Arc::new(cache_with(provider.clone(), 2));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move { cache.get(9).await }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_err());
        }

        // Bounded: exactly `attempts` upstream calls, shared by all waiters,
        // and the failure is cached for the rest of the run.
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
        assert!(cache.get(9).await.is_err());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn permanent_failures_are_not_retried() {
        let provider = Arc::new(CountingProvider::failing_first(99, ProviderError::Permanent));
        let cache = cache_with(provider.clone(), 5);

        assert!(cache.get(3).await.is_err());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }
}
