//! Plex media server client.
//!
//! Implements both collaborator traits around the pipeline: catalog listing
//! ([`CatalogSource`]) and playlist publishing ([`PlaylistPublisher`]).
//! All requests are token-authenticated and ask for JSON responses; the
//! server's default is XML.
//!
//! Account/server discovery is out of scope here: the server URL, token, and
//! library section are taken from configuration.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use crate::catalog::{CatalogSource, PlaylistPublisher};
use crate::config::PlexConfig;
use crate::model::{EpisodeRef, ItemKind, MediaItem};

/// Plex item type code for episodes, used to flatten show sections.
const EPISODE_TYPE: &str = "4";

// ---------------------------------------------------------------------------
// Plex API response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct MediaContainerResponse<T> {
    #[serde(rename = "MediaContainer")]
    media_container: T,
}

#[derive(Debug, Deserialize)]
struct ServerInfo {
    #[serde(rename = "machineIdentifier")]
    machine_identifier: String,
}

#[derive(Debug, Deserialize)]
struct SectionContainer {
    #[serde(rename = "Directory", default)]
    directories: Vec<SectionDirectory>,
}

#[derive(Debug, Deserialize)]
struct SectionDirectory {
    key: String,
    title: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct ItemContainer {
    #[serde(rename = "Metadata", default)]
    metadata: Vec<ItemMetadata>,
}

#[derive(Debug, Deserialize)]
struct ItemMetadata {
    #[serde(rename = "ratingKey")]
    rating_key: String,
    #[serde(rename = "type")]
    kind: Option<String>,
    guid: Option<String>,
    title: Option<String>,
    summary: Option<String>,
    year: Option<u16>,
    #[serde(rename = "grandparentTitle")]
    grandparent_title: Option<String>,
    #[serde(rename = "parentIndex")]
    parent_index: Option<u16>,
    index: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct PlaylistContainer {
    #[serde(rename = "Metadata", default)]
    metadata: Vec<PlaylistMetadata>,
}

#[derive(Debug, Deserialize)]
struct PlaylistMetadata {
    #[serde(rename = "ratingKey")]
    rating_key: String,
    title: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Token-authenticated client for one Plex media server.
pub struct PlexServer {
    client: reqwest::Client,
    base_url: String,
    token: String,
    section: String,
}

impl PlexServer {
    /// Create a client for the configured server with the given request
    /// timeout.
    pub fn new(config: &PlexConfig, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("Failed to build Plex HTTP client")?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            section: config.section.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = self.url(path);
        debug!(url = %url, "Plex GET");

        let resp = self
            .client
            .get(&url)
            .query(&[("X-Plex-Token", self.token.as_str())])
            .query(params)
            .send()
            .await
            .with_context(|| format!("Failed to GET {path}"))?
            .error_for_status()
            .with_context(|| format!("Plex returned an error for {path}"))?;

        resp.json()
            .await
            .with_context(|| format!("Failed to parse Plex response for {path}"))
    }

    async fn send_mutation(
        &self,
        method: reqwest::Method,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<()> {
        let url = self.url(path);
        debug!(url = %url, method = %method, "Plex mutation");

        self.client
            .request(method, &url)
            .query(&[("X-Plex-Token", self.token.as_str())])
            .query(params)
            .send()
            .await
            .with_context(|| format!("Failed to call {path}"))?
            .error_for_status()
            .with_context(|| format!("Plex returned an error for {path}"))?;

        Ok(())
    }

    /// Server machine identifier, needed to build playlist item URIs.
    async fn machine_identifier(&self) -> Result<String> {
        let resp: MediaContainerResponse<ServerInfo> = self.get_json("/", &[]).await?;
        Ok(resp.media_container.machine_identifier)
    }

    /// Find the configured library section by title.
    async fn find_section(&self) -> Result<SectionDirectory> {
        let resp: MediaContainerResponse<SectionContainer> =
            self.get_json("/library/sections", &[]).await?;

        resp.media_container
            .directories
            .into_iter()
            .find(|d| d.title == self.section)
            .with_context(|| format!("Library section not found: {}", self.section))
    }

    /// Find an existing playlist by exact title.
    async fn find_playlist(&self, name: &str) -> Result<Option<PlaylistMetadata>> {
        let resp: MediaContainerResponse<PlaylistContainer> =
            self.get_json("/playlists", &[]).await?;

        Ok(resp
            .media_container
            .metadata
            .into_iter()
            .find(|p| p.title == name))
    }

    /// Build the `server://` URI Plex uses to reference a set of items.
    fn item_uri(machine_identifier: &str, items: &[MediaItem]) -> String {
        let keys: Vec<&str> = items.iter().map(|i| i.rating_key.as_str()).collect();
        format!(
            "server://{}/com.plexapp.plugins.library/library/metadata/{}",
            machine_identifier,
            keys.join(",")
        )
    }
}

/// Map one Plex metadata entry to a [`MediaItem`].
///
/// Items the server reports as neither movies nor episodes are dropped by
/// the caller. A missing GUID maps to an empty string, which the resolver
/// degrades to an unsupported-provider outcome rather than an error.
fn to_media_item(meta: ItemMetadata) -> Option<MediaItem> {
    let kind = match meta.kind.as_deref() {
        Some("movie") => ItemKind::Movie,
        Some("episode") => ItemKind::Episode,
        _ => return None,
    };

    let episode = if kind == ItemKind::Episode {
        match (meta.grandparent_title, meta.parent_index, meta.index) {
            (Some(series_title), Some(season), Some(episode)) => Some(EpisodeRef {
                series_title,
                season,
                episode,
            }),
            _ => None,
        }
    } else {
        None
    };

    Some(MediaItem {
        rating_key: meta.rating_key,
        kind,
        title: meta.title.unwrap_or_default(),
        year: meta.year,
        summary: meta.summary.unwrap_or_default(),
        episode,
        guid: meta.guid.unwrap_or_default(),
    })
}

#[async_trait]
impl CatalogSource for PlexServer {
    /// List the configured section as a flat item sequence.
    ///
    /// Movie sections are already flat; show sections are enumerated as
    /// episodes so each episode is evaluated on its own.
    async fn list_items(&self) -> Result<Vec<MediaItem>> {
        let section = self.find_section().await?;
        let path = format!("/library/sections/{}/all", section.key);

        let resp: MediaContainerResponse<ItemContainer> = if section.kind == "movie" {
            self.get_json(&path, &[]).await?
        } else {
            self.get_json(&path, &[("type", EPISODE_TYPE)]).await?
        };

        let items: Vec<MediaItem> = resp
            .media_container
            .metadata
            .into_iter()
            .filter_map(to_media_item)
            .collect();

        info!(
            section = %section.title,
            count = items.len(),
            "Listed catalog items"
        );
        Ok(items)
    }
}

#[async_trait]
impl PlaylistPublisher for PlexServer {
    /// Append the items to the named playlist, creating it if necessary.
    ///
    /// An empty item set is a no-op: no playlist is created and no request
    /// is sent.
    async fn publish(&self, name: &str, items: &[MediaItem]) -> Result<()> {
        if items.is_empty() {
            info!(playlist = name, "No items to publish, leaving playlists untouched");
            return Ok(());
        }

        let machine_identifier = self.machine_identifier().await?;
        let uri = Self::item_uri(&machine_identifier, items);

        match self.find_playlist(name).await? {
            Some(existing) => {
                let path = format!("/playlists/{}/items", existing.rating_key);
                self.send_mutation(reqwest::Method::PUT, &path, &[("uri", uri.as_str())])
                    .await?;
                info!(playlist = name, count = items.len(), "Appended to existing playlist");
            }
            None => {
                self.send_mutation(
                    reqwest::Method::POST,
                    "/playlists",
                    &[
                        ("type", "video"),
                        ("title", name),
                        ("smart", "0"),
                        ("uri", uri.as_str()),
                    ],
                )
                .await?;
                info!(playlist = name, count = items.len(), "Created playlist");
            }
        }

        Ok(())
    }
}
