//! Collaborator interfaces around the scan pipeline.
//!
//! The pipeline itself only sees a fully enumerated `Vec<MediaItem>` going in
//! and a matched subset going out; where those items come from and where the
//! playlist lands is behind these traits. [`crate::plex::PlexServer`]
//! implements both against a real media server.

use anyhow::Result;
use async_trait::async_trait;

use crate::model::MediaItem;

/// Produces the ordered item list for the configured library section.
///
/// The sequence is fully enumerated before the scheduler starts; there is no
/// streaming contract.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn list_items(&self) -> Result<Vec<MediaItem>>;
}

/// Accepts the final matched set under an output name.
///
/// Implementations must be idempotent with respect to the name: publishing to
/// an existing playlist appends to it rather than erroring or duplicating the
/// playlist, and publishing an empty item set is a no-op that must not create
/// an empty playlist.
#[async_trait]
pub trait PlaylistPublisher: Send + Sync {
    async fn publish(&self, name: &str, items: &[MediaItem]) -> Result<()>;
}
