//! Resolution of catalog GUIDs to the primary provider's id scheme.
//!
//! Plex legacy agents encode the matching provider and its native id in the
//! item GUID. Movies matched by the IMDb agent carry the `tt`-prefixed id
//! directly; episodes matched by the TVDb agent carry a
//! `series/season/episode` triple that has to be translated through the
//! series episode index.

use std::sync::Arc;

use regex::Regex;
use tracing::debug;

use crate::model::{ItemKind, MediaItem};

use super::series_cache::SeriesCache;

/// External identifier for one catalog item, in the primary provider's
/// id scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalId {
    /// A resolved IMDb title id (`tt` followed by digits).
    Imdb(String),
    /// No id could be determined. A normal outcome, not an error: the item
    /// can still match on title or summary.
    Unresolved(UnresolvedReason),
}

/// Why an item could not be resolved to an external id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// The GUID belongs to no agent namespace we understand, or is missing.
    UnsupportedProvider,
    /// The series index has no entry for this (season, episode) position.
    EpisodeNotIndexed,
    /// The series index itself could not be fetched.
    SeriesLookupFailed,
}

/// Maps catalog items to [`ExternalId`]s, consulting the shared series cache
/// for episodes.
pub struct IdentifierResolver {
    series_cache: Arc<SeriesCache>,
    movie_guid: Regex,
    episode_guid: Regex,
}

impl IdentifierResolver {
    /// Create a resolver that shares `series_cache` with every other worker.
    pub fn new(series_cache: Arc<SeriesCache>) -> Self {
        let movie_guid = Regex::new(r"agents\.imdb://(?P<id>tt\d+)")
            .expect("movie GUID pattern is valid");
        let episode_guid =
            Regex::new(r"agents\.thetvdb://(?P<series>\d+)/(?P<season>\d+)/(?P<episode>\d+)")
                .expect("episode GUID pattern is valid");
        Self {
            series_cache,
            movie_guid,
            episode_guid,
        }
    }

    /// Resolve `item` to an external id.
    ///
    /// Never fails: malformed or unrecognized GUIDs and upstream lookup
    /// failures all degrade to [`ExternalId::Unresolved`].
    pub async fn resolve(&self, item: &MediaItem) -> ExternalId {
        match item.kind {
            ItemKind::Movie => self.resolve_movie(item),
            ItemKind::Episode => self.resolve_episode(item).await,
        }
    }

    fn resolve_movie(&self, item: &MediaItem) -> ExternalId {
        match self.movie_guid.captures(&item.guid) {
            Some(caps) => ExternalId::Imdb(caps["id"].to_string()),
            None => {
                debug!(
                    rating_key = %item.rating_key,
                    guid = %item.guid,
                    "Movie GUID is not in the IMDb agent namespace"
                );
                ExternalId::Unresolved(UnresolvedReason::UnsupportedProvider)
            }
        }
    }

    async fn resolve_episode(&self, item: &MediaItem) -> ExternalId {
        let caps = match self.episode_guid.captures(&item.guid) {
            Some(caps) => caps,
            None => {
                debug!(
                    rating_key = %item.rating_key,
                    guid = %item.guid,
                    "Episode GUID is not in the TVDb agent namespace"
                );
                return ExternalId::Unresolved(UnresolvedReason::UnsupportedProvider);
            }
        };

        // The patterns only capture digits; parse failures mean the numbers
        // are out of range for their types, which no real agent GUID hits.
        let parsed = (
            caps["series"].parse::<u32>(),
            caps["season"].parse::<u16>(),
            caps["episode"].parse::<u16>(),
        );
        let (series_id, season, episode) = match parsed {
            (Ok(s), Ok(se), Ok(ep)) => (s, se, ep),
            _ => return ExternalId::Unresolved(UnresolvedReason::UnsupportedProvider),
        };

        let record = match self.series_cache.get(series_id).await {
            Ok(record) => record,
            Err(_) => return ExternalId::Unresolved(UnresolvedReason::SeriesLookupFailed),
        };

        match record.episode_id(season, episode) {
            Some(raw) => ExternalId::Imdb(canonical_imdb_id(raw)),
            None => {
                debug!(
                    rating_key = %item.rating_key,
                    series_id,
                    season,
                    episode,
                    "Series index has no entry for this episode"
                );
                ExternalId::Unresolved(UnresolvedReason::EpisodeNotIndexed)
            }
        }
    }
}

/// Normalize a provider-native episode id to the canonical `tt…` form.
///
/// The episode database stores IMDb ids sometimes with and sometimes without
/// the `tt` prefix.
fn canonical_imdb_id(raw: &str) -> String {
    if raw.starts_with("tt") {
        raw.to_string()
    } else {
        format!("tt{raw}")
    }
}
