use std::path::PathBuf;

use async_trait::async_trait;
use shared::domain::Artist;
use thiserror::Error;

mod cache;
mod file;
mod spotify;

pub use cache::CachedProvider;
pub use file::FileProvider;
pub use spotify::{
    artists_from_search, ClientCredentials, SearchArtist, SearchResponse, SpotifyProvider,
    SPOTIFY_ACCOUNTS_URL, SPOTIFY_API_URL,
};

/// Spotify caps artist search pages at 50.
pub const MAX_SEARCH_LIMIT: u32 = 50;

/// A search against the artist catalog. Doubles as the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CatalogQuery {
    pub query: String,
    pub limit: u32,
}

impl CatalogQuery {
    pub fn new(query: impl Into<String>, limit: u32) -> Self {
        Self {
            query: query.into(),
            limit: limit.clamp(1, MAX_SEARCH_LIMIT),
        }
    }
}

impl Default for CatalogQuery {
    /// A one-letter search comes back ranked by relevance, which is close
    /// enough to "popular artists" for the game.
    fn default() -> Self {
        Self::new("a", MAX_SEARCH_LIMIT)
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("catalog rejected client credentials ({status}): {body}")]
    Auth { status: u16, body: String },
    #[error("catalog returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed catalog response: {0}")]
    Malformed(String),
    #[error("failed to read artists file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Source of the artists a game is played with.
///
/// Implementations return only artists that carry an image; an empty list is
/// a valid answer and is left for the game to reject.
#[async_trait]
pub trait ArtistProvider: Send + Sync {
    async fn fetch_artists(&self, query: &CatalogQuery) -> Result<Vec<Artist>, ProviderError>;
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
