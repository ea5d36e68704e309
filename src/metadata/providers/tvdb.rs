//! TVDb series provider.
//!
//! Implements [`SeriesProvider`] against a TVDb-style REST endpoint. One call
//! fetches the full episode index for a series; entries without a season,
//! episode number, or IMDb id are skipped rather than treated as errors.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::TvdbConfig;
use crate::metadata::provider::{ProviderError, SeriesProvider, SeriesRecord};

#[derive(Debug, Deserialize)]
struct EpisodesResponse {
    #[serde(default)]
    data: Vec<EpisodeEntry>,
}

#[derive(Debug, Deserialize)]
struct EpisodeEntry {
    #[serde(rename = "seasonNumber")]
    season_number: Option<u16>,
    number: Option<u16>,
    #[serde(rename = "imdbId")]
    imdb_id: Option<String>,
}

/// TVDb episode-index endpoint client.
pub struct TvdbClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl TvdbClient {
    /// Create a client with the given request timeout.
    pub fn new(config: &TvdbConfig, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build reqwest client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    fn url(&self, series_id: u32) -> String {
        format!("{}/series/{}/episodes", self.base_url, series_id)
    }
}

#[async_trait]
impl SeriesProvider for TvdbClient {
    fn name(&self) -> &'static str {
        "tvdb"
    }

    async fn fetch_series(
        &self,
        series_id: u32,
        locale: &str,
    ) -> Result<SeriesRecord, ProviderError> {
        let url = self.url(series_id);
        debug!(url = %url, locale, "TVDb series lookup");

        let resp = self
            .client
            .get(&url)
            .query(&[("lang", locale)])
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?
            .error_for_status()
            .map_err(ProviderError::from_reqwest)?;

        let body: EpisodesResponse = resp.json().await.map_err(ProviderError::from_reqwest)?;

        let total = body.data.len();
        let episodes: HashMap<(u16, u16), String> = body
            .data
            .into_iter()
            .filter_map(|e| match (e.season_number, e.number, e.imdb_id) {
                (Some(season), Some(number), Some(imdb_id)) if !imdb_id.is_empty() => {
                    Some(((season, number), imdb_id))
                }
                _ => None,
            })
            .collect();

        if episodes.len() < total {
            debug!(
                series_id,
                indexed = episodes.len(),
                total,
                "Some episodes lack an IMDb id and were skipped"
            );
        }

        Ok(SeriesRecord::new(series_id, episodes))
    }
}
