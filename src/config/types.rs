use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::metadata::RetryPolicy;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub plex: PlexConfig,

    #[serde(default)]
    pub providers: ProvidersConfig,

    #[serde(default)]
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlexConfig {
    /// Base URL of the Plex media server.
    #[serde(default = "default_plex_url")]
    pub url: String,

    /// X-Plex-Token for the server. Required for scanning.
    #[serde(default)]
    pub token: String,

    /// Library section to scan, by title.
    #[serde(default = "default_section")]
    pub section: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub imdb: ImdbConfig,

    #[serde(default)]
    pub tvdb: TvdbConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImdbConfig {
    /// Base URL of the keyword endpoint.
    #[serde(default = "default_imdb_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TvdbConfig {
    /// Base URL of the episode-database endpoint.
    #[serde(default = "default_tvdb_base_url")]
    pub base_url: String,

    /// API key, sent as a bearer token.
    #[serde(default)]
    pub api_key: String,

    /// Locale passed to series lookups.
    #[serde(default = "default_locale")]
    pub locale: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanConfig {
    /// Maximum number of item pipelines in flight at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Total attempts per upstream call (series fetch, keyword fetch).
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Fixed delay between attempts, in seconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,

    /// Per-request HTTP timeout, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl ScanConfig {
    /// Retry policy for the two upstream call sites.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.retry_attempts,
            delay: Duration::from_secs(self.retry_delay_secs),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_plex_url() -> String {
    "http://127.0.0.1:32400".to_string()
}
fn default_section() -> String {
    "Movies".to_string()
}
fn default_imdb_base_url() -> String {
    "https://api.imdbapi.dev".to_string()
}
fn default_tvdb_base_url() -> String {
    "https://api4.thetvdb.com/v4".to_string()
}
fn default_locale() -> String {
    "en".to_string()
}
fn default_concurrency() -> usize {
    10
}
fn default_retry_attempts() -> u32 {
    3
}
fn default_retry_delay() -> u64 {
    2
}
fn default_request_timeout() -> u64 {
    30
}

impl Default for PlexConfig {
    fn default() -> Self {
        Self {
            url: default_plex_url(),
            token: String::new(),
            section: default_section(),
        }
    }
}

impl Default for ImdbConfig {
    fn default() -> Self {
        Self {
            base_url: default_imdb_base_url(),
        }
    }
}

impl Default for TvdbConfig {
    fn default() -> Self {
        Self {
            base_url: default_tvdb_base_url(),
            api_key: String::new(),
            locale: default_locale(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            retry_attempts: default_retry_attempts(),
            retry_delay_secs: default_retry_delay(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}
