//! Trait definitions and error classification for metadata providers.
//!
//! Two upstream services feed the pipeline: a primary keyword provider (IMDb)
//! and a secondary episode-database provider (TVDb). Both are reached through
//! the traits here so the pipeline can be exercised against stubs in tests.
//! Providers are expected to be wrapped in an `Arc` and shared across tasks.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

/// Error returned by provider calls, classified for retry decisions.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Timeouts, connection resets, 429/5xx responses. Worth retrying.
    #[error("transient provider error: {0}")]
    Transient(String),

    /// Unknown ids, 4xx responses, malformed payloads. Retrying cannot help.
    #[error("permanent provider error: {0}")]
    Permanent(String),
}

impl ProviderError {
    /// Whether a bounded retry is worthwhile for this error.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// Classify a transport-level error from `reqwest`.
    ///
    /// Rate limiting (429) and server errors are transient; other HTTP status
    /// failures are permanent. Errors without a status (connect failures,
    /// timeouts, resets mid-body) are transient, while decode failures are
    /// permanent.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Self::Transient(err.to_string());
            }
            return Self::Permanent(err.to_string());
        }

        if err.is_timeout() || err.is_connect() || err.is_request() || err.is_body() {
            return Self::Transient(err.to_string());
        }

        Self::Permanent(err.to_string())
    }
}

/// Fixed-delay retry policy applied at the two upstream call sites.
///
/// `attempts` counts total tries, not re-tries; the policy is always bounded.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

/// Episode index for one series as returned by the secondary provider.
///
/// Populated once by the series cache and shared read-only behind an `Arc`
/// for the rest of the run.
#[derive(Debug, Clone)]
pub struct SeriesRecord {
    series_id: u32,
    episodes: HashMap<(u16, u16), String>,
}

impl SeriesRecord {
    /// Create a record from a (season, episode) -> external-id map.
    pub fn new(series_id: u32, episodes: HashMap<(u16, u16), String>) -> Self {
        Self {
            series_id,
            episodes,
        }
    }

    /// The provider-side series id this record was fetched for.
    pub fn series_id(&self) -> u32 {
        self.series_id
    }

    /// External episode id for the given position, if the series has one.
    pub fn episode_id(&self, season: u16, episode: u16) -> Option<&str> {
        self.episodes.get(&(season, episode)).map(String::as_str)
    }

    /// Number of indexed episodes.
    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }
}

/// Primary metadata provider: keyword lookup by external title id.
#[async_trait]
pub trait KeywordProvider: Send + Sync {
    /// Short, lowercase identifier for this provider (e.g. `"imdb"`).
    fn name(&self) -> &'static str;

    /// Fetch the raw keyword list for a title.
    ///
    /// An empty list is a valid response for titles without keyword data.
    async fn keywords(&self, title_id: &str) -> Result<Vec<String>, ProviderError>;
}

/// Secondary provider: full episode index for a series.
#[async_trait]
pub trait SeriesProvider: Send + Sync {
    /// Short, lowercase identifier for this provider (e.g. `"tvdb"`).
    fn name(&self) -> &'static str;

    /// Fetch the episode index for `series_id` in the given locale.
    async fn fetch_series(&self, series_id: u32, locale: &str)
        -> Result<SeriesRecord, ProviderError>;
}
