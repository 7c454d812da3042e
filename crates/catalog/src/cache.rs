use std::collections::HashMap;

use async_trait::async_trait;
use shared::domain::Artist;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{ArtistProvider, CatalogQuery, ProviderError};

/// Memoizes successful fetches for the lifetime of the process.
///
/// Failed fetches are not remembered, so the next start or restart asks the
/// inner provider again.
pub struct CachedProvider<P> {
    inner: P,
    entries: Mutex<HashMap<CatalogQuery, Vec<Artist>>>,
}

impl<P: ArtistProvider> CachedProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub async fn cached_queries(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[async_trait]
impl<P: ArtistProvider> ArtistProvider for CachedProvider<P> {
    async fn fetch_artists(&self, query: &CatalogQuery) -> Result<Vec<Artist>, ProviderError> {
        // Held across the fetch so concurrent first loads hit the catalog once.
        let mut entries = self.entries.lock().await;
        if let Some(artists) = entries.get(query) {
            debug!(query = %query.query, count = artists.len(), "artist cache hit");
            return Ok(artists.clone());
        }

        let artists = self.inner.fetch_artists(query).await?;
        info!(query = %query.query, count = artists.len(), "artist cache filled");
        entries.insert(query.clone(), artists.clone());
        Ok(artists)
    }
}
