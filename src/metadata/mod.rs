//! Identifier resolution and keyword retrieval against external metadata
//! providers.
//!
//! The module is split the same way the pipeline consumes it: provider
//! traits and error classification in [`provider`], concrete HTTP clients in
//! [`providers`], GUID resolution in [`resolver`], the single-flight series
//! cache in [`series_cache`], and keyword fetching with retry in
//! [`keywords`].

pub mod keywords;
pub mod provider;
pub mod providers;
pub mod resolver;
pub mod series_cache;

pub use keywords::KeywordFetcher;
pub use provider::{KeywordProvider, ProviderError, RetryPolicy, SeriesProvider, SeriesRecord};
pub use resolver::{ExternalId, IdentifierResolver, UnresolvedReason};
pub use series_cache::SeriesCache;
