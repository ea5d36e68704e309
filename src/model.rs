//! Core data model shared by the catalog, metadata, and pipeline layers.

use std::collections::HashSet;

/// Set of lowercase keywords attached to a media item.
///
/// An empty set is a valid, terminal outcome -- it means "no keyword data",
/// not "lookup failed".
pub type KeywordSet = HashSet<String>;

/// Whether a catalog item is a standalone movie or a single episode of a show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Movie,
    Episode,
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemKind::Movie => write!(f, "movie"),
            ItemKind::Episode => write!(f, "episode"),
        }
    }
}

/// Position of an episode within its parent series, as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeRef {
    /// Display title of the parent series.
    pub series_title: String,
    /// Season number within the series.
    pub season: u16,
    /// Episode number within the season.
    pub episode: u16,
}

/// A single item from the media catalog.
///
/// Items are created once per scan and never mutated afterwards; the pipeline
/// clones them into per-task work and back out into [`MatchResult`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    /// Catalog-local identifier (Plex rating key).
    pub rating_key: String,
    /// Movie or episode.
    pub kind: ItemKind,
    /// Display title.
    pub title: String,
    /// Release year, if the catalog knows it.
    pub year: Option<u16>,
    /// Synopsis text. Empty when the catalog has none.
    pub summary: String,
    /// Parent series position; present only for episodes.
    pub episode: Option<EpisodeRef>,
    /// Opaque agent GUID emitted by the catalog. Encodes which external
    /// provider matched the item and that provider's native id.
    pub guid: String,
}

/// Which field of an item produced a keyword match.
///
/// Matching is evaluated in this order (title, then summary, then keywords)
/// and short-circuits on the first hit, so the reason always names the
/// highest-precedence field that matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchReason {
    Title,
    Summary,
    Keyword,
    None,
}

/// Outcome of evaluating one catalog item against the search term.
///
/// The scheduler produces exactly one of these per submitted item, in the
/// input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub item: MediaItem,
    pub matched: bool,
    pub reason: MatchReason,
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Build a movie item with the given title and summary.
    pub fn movie(rating_key: &str, title: &str, summary: &str, guid: &str) -> MediaItem {
        MediaItem {
            rating_key: rating_key.to_string(),
            kind: ItemKind::Movie,
            title: title.to_string(),
            year: Some(2017),
            summary: summary.to_string(),
            episode: None,
            guid: guid.to_string(),
        }
    }

    /// Build an episode item with the given series position and GUID.
    pub fn episode(rating_key: &str, title: &str, season: u16, number: u16, guid: &str) -> MediaItem {
        MediaItem {
            rating_key: rating_key.to_string(),
            kind: ItemKind::Episode,
            title: title.to_string(),
            year: None,
            summary: String::new(),
            episode: Some(EpisodeRef {
                series_title: "Test Series".to_string(),
                season,
                episode: number,
            }),
            guid: guid.to_string(),
        }
    }
}
