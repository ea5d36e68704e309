//! Concrete metadata provider clients.

pub mod imdb;
pub mod tvdb;

pub use imdb::ImdbClient;
pub use tvdb::TvdbClient;
