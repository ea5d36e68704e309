//! IMDb keyword provider.
//!
//! Implements [`KeywordProvider`] against an IMDb-compatible REST endpoint.
//!
//! Features:
//! - Token-bucket rate limiting at 4 requests / second via [`governor`].
//! - Error classification into transient vs permanent for the fetcher's
//!   retry policy; retrying itself is the caller's job.
//! - Per-request timeout inherited from the shared client configuration.

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use serde::Deserialize;
use tracing::debug;

use crate::config::ImdbConfig;
use crate::metadata::provider::{KeywordProvider, ProviderError};

/// Requests per second against the keyword endpoint.
const REQUESTS_PER_SECOND: u32 = 4;

#[derive(Debug, Deserialize)]
struct KeywordsResponse {
    #[serde(default)]
    keywords: Vec<String>,
}

/// IMDb keyword endpoint client.
///
/// The base URL is configurable so tests can point the client at a local
/// mock server.
pub struct ImdbClient {
    client: reqwest::Client,
    base_url: String,
    rate_limiter: governor::RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl ImdbClient {
    /// Create a client with the given request timeout.
    pub fn new(config: &ImdbConfig, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build reqwest client");

        let quota = Quota::per_second(NonZeroU32::new(REQUESTS_PER_SECOND).unwrap());
        let rate_limiter = RateLimiter::direct(quota);

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            rate_limiter,
        }
    }

    fn url(&self, title_id: &str) -> String {
        format!("{}/titles/{}/keywords", self.base_url, title_id)
    }
}

#[async_trait]
impl KeywordProvider for ImdbClient {
    fn name(&self) -> &'static str {
        "imdb"
    }

    async fn keywords(&self, title_id: &str) -> Result<Vec<String>, ProviderError> {
        self.rate_limiter.until_ready().await;

        let url = self.url(title_id);
        debug!(url = %url, "IMDb keyword lookup");

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?
            .error_for_status()
            .map_err(ProviderError::from_reqwest)?;

        let body: KeywordsResponse = resp.json().await.map_err(ProviderError::from_reqwest)?;
        Ok(body.keywords)
    }
}
