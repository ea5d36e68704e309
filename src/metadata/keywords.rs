//! Keyword retrieval with bounded retry and graceful degradation.
//!
//! A failed keyword lookup never aborts an item's pipeline: after the retry
//! budget is spent the fetcher returns an empty set and the item falls back
//! to title/summary matching only.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::model::KeywordSet;

use super::provider::{KeywordProvider, RetryPolicy};
use super::resolver::ExternalId;

/// Fetches and normalizes the keyword set for a resolved identifier.
pub struct KeywordFetcher {
    provider: Arc<dyn KeywordProvider>,
    retry: RetryPolicy,
}

impl KeywordFetcher {
    pub fn new(provider: Arc<dyn KeywordProvider>, retry: RetryPolicy) -> Self {
        Self { provider, retry }
    }

    /// Fetch keywords for `id`, lowercased for case-insensitive matching.
    ///
    /// Unresolved identifiers return an empty set immediately with no
    /// upstream call. Transient provider errors are retried with a fixed
    /// delay up to the configured attempt count; exhaustion (or a permanent
    /// error) also yields an empty set.
    pub async fn fetch(&self, id: &ExternalId) -> KeywordSet {
        let title_id = match id {
            ExternalId::Imdb(raw) => raw,
            ExternalId::Unresolved(reason) => {
                debug!(?reason, "No external id, skipping keyword fetch");
                return KeywordSet::new();
            }
        };

        let mut attempt = 1;
        loop {
            match self.provider.keywords(title_id).await {
                Ok(words) => {
                    debug!(
                        title_id = %title_id,
                        count = words.len(),
                        provider = self.provider.name(),
                        "Fetched keywords"
                    );
                    return words.into_iter().map(|w| w.to_lowercase()).collect();
                }
                Err(e) if e.is_transient() && attempt < self.retry.attempts => {
                    warn!(
                        title_id = %title_id,
                        attempt,
                        error = %e,
                        "Keyword fetch failed, retrying"
                    );
                    tokio::time::sleep(self.retry.delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!(
                        title_id = %title_id,
                        attempts = attempt,
                        error = %e,
                        "Keyword fetch failed, matching on title and summary only"
                    );
                    return KeywordSet::new();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::provider::ProviderError;
    use crate::metadata::resolver::UnresolvedReason;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    struct StubKeywords {
        calls: AtomicU32,
        fail_first: u32,
        failure: fn(String) -> ProviderError,
        words: Vec<&'static str>,
    }

    impl StubKeywords {
        fn returning(words: Vec<&'static str>) -> Self {
            Self {
                calls: AtomicU32::new(0),
                fail_first: 0,
                failure: ProviderError::Transient,
                words,
            }
        }

        fn failing_first(n: u32, failure: fn(String) -> ProviderError) -> Self {
            Self {
                calls: AtomicU32::new(0),
                fail_first: n,
                failure,
                words: vec!["christmas"],
            }
        }
    }

    #[async_trait]
    impl KeywordProvider for StubKeywords {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn keywords(&self, _title_id: &str) -> Result<Vec<String>, ProviderError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.fail_first {
                return Err((self.failure)("induced failure".to_string()));
            }
            Ok(self.words.iter().map(|w| w.to_string()).collect())
        }
    }

    fn fetcher(provider: Arc<StubKeywords>, attempts: u32) -> KeywordFetcher {
        KeywordFetcher::new(
            provider,
            RetryPolicy {
                attempts,
                delay: Duration::from_millis(1),
            },
        )
    }

    #[tokio::test]
    async fn unresolved_id_skips_upstream_call() {
        let provider = Arc::new(StubKeywords::returning(vec!["christmas"]));
        let fetcher = fetcher(provider.clone(), 3);

        let set = fetcher
            .fetch(&ExternalId::Unresolved(UnresolvedReason::EpisodeNotIndexed))
            .await;
        assert!(set.is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn keywords_are_lowercased() {
        let provider = Arc::new(StubKeywords::returning(vec!["Christmas", "FAMILY"]));
        let fetcher = fetcher(provider, 3);

        let set = fetcher.fetch(&ExternalId::Imdb("tt1".to_string())).await;
        assert!(set.contains("christmas"));
        assert!(set.contains("family"));
        assert_eq!(set.len(), 2);
    }

    #[tokio::test]
    async fn transient_failures_retry_then_succeed() {
        let provider = Arc::new(StubKeywords::failing_first(2, ProviderError::Transient));
        let fetcher = fetcher(provider.clone(), 3);

        let set = fetcher.fetch(&ExternalId::Imdb("tt1".to_string())).await;
        assert!(set.contains("christmas"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausted_retries_degrade_to_empty() {
        let provider = Arc::new(StubKeywords::failing_first(99, ProviderError::Transient));
        let fetcher = fetcher(provider.clone(), 3);

        let set = fetcher.fetch(&ExternalId::Imdb("tt1".to_string())).await;
        assert!(set.is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_failures_are_not_retried() {
        let provider = Arc::new(StubKeywords::failing_first(99, ProviderError::Permanent));
        let fetcher = fetcher(provider.clone(), 5);

        let set = fetcher.fetch(&ExternalId::Imdb("tt1".to_string())).await;
        assert!(set.is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }
}
