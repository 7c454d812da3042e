use std::path::PathBuf;

use async_trait::async_trait;
use shared::domain::Artist;
use tracing::{debug, info};

use crate::{ArtistProvider, CatalogQuery, ProviderError};

/// Reads artists from a JSON array of `{ "id", "name", "image_url" }` records.
///
/// The search text is ignored; the file already is the answer.
#[derive(Debug, Clone)]
pub struct FileProvider {
    path: PathBuf,
}

impl FileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ArtistProvider for FileProvider {
    async fn fetch_artists(&self, query: &CatalogQuery) -> Result<Vec<Artist>, ProviderError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| ProviderError::Io {
                path: self.path.clone(),
                source,
            })?;
        let records: Vec<Artist> =
            serde_json::from_str(&raw).map_err(|e| ProviderError::Malformed(e.to_string()))?;
        debug!(path = %self.path.display(), records = records.len(), query = %query.query, "read artists file");

        let artists: Vec<Artist> = records
            .into_iter()
            .filter(Artist::has_image)
            .take(query.limit as usize)
            .collect();
        info!(path = %self.path.display(), count = artists.len(), "loaded artists from file");
        Ok(artists)
    }
}
