use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use shared::domain::Artist;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use crate::{ArtistProvider, CatalogQuery, ProviderError};

pub const SPOTIFY_API_URL: &str = "https://api.spotify.com";
pub const SPOTIFY_ACCOUNTS_URL: &str = "https://accounts.spotify.com";

/// Tokens are refreshed this long before Spotify says they expire.
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 30;
/// Upper bound on the lifetime we trust from a token response.
const MAX_TOKEN_LIFETIME_SECS: i64 = 24 * 60 * 60;
const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(TOKEN_EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub artists: Option<ArtistPage>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ArtistPage {
    #[serde(default)]
    pub items: Vec<Option<SearchArtist>>,
}

#[derive(Debug, Deserialize)]
pub struct SearchArtist {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<ImageObject>>,
}

#[derive(Debug, Deserialize)]
pub struct ImageObject {
    pub url: String,
}

/// Keeps the search results the game can use.
///
/// Spotify lists images largest first, so the first one is taken. Entries
/// without an image, an id or a name are skipped; duplicates are not.
pub fn artists_from_search(response: SearchResponse) -> Vec<Artist> {
    let Some(page) = response.artists else {
        return Vec::new();
    };

    page.items
        .into_iter()
        .flatten()
        .filter_map(|item| {
            let image_url = item.images?.into_iter().next()?.url;
            let artist = Artist::new(item.id?, item.name?, image_url);
            artist.has_image().then_some(artist)
        })
        .collect()
}

/// Artist search against the Spotify Web API using the client-credentials flow.
pub struct SpotifyProvider {
    http: Client,
    search_url: Url,
    token_url: Url,
    credentials: ClientCredentials,
    token: Mutex<Option<AccessToken>>,
}

impl SpotifyProvider {
    pub fn new(credentials: ClientCredentials) -> Result<Self, url::ParseError> {
        Self::with_endpoints(credentials, SPOTIFY_API_URL, SPOTIFY_ACCOUNTS_URL)
    }

    pub fn with_endpoints(
        credentials: ClientCredentials,
        api_url: &str,
        accounts_url: &str,
    ) -> Result<Self, url::ParseError> {
        Ok(Self {
            http: Client::new(),
            search_url: endpoint(api_url, "v1/search")?,
            token_url: endpoint(accounts_url, "api/token")?,
            credentials,
            token: Mutex::new(None),
        })
    }

    async fn access_token(&self) -> Result<String, ProviderError> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref().filter(|token| token.is_fresh(Utc::now())) {
            return Ok(token.value.clone());
        }

        let response = self
            .http
            .post(self.token_url.clone())
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = error_body(response).await;
            warn!(status, "spotify token request rejected");
            return Err(ProviderError::Auth { status, body });
        }

        let body: TokenResponse = response.json().await.map_err(malformed)?;
        let token = AccessToken {
            value: body.access_token,
            expires_at: Utc::now()
                + Duration::seconds(body.expires_in.clamp(0, MAX_TOKEN_LIFETIME_SECS)),
        };
        debug!(expires_at = %token.expires_at, "spotify access token issued");
        let value = token.value.clone();
        *guard = Some(token);
        Ok(value)
    }

    async fn forget_token(&self) {
        self.token.lock().await.take();
    }
}

#[async_trait]
impl ArtistProvider for SpotifyProvider {
    async fn fetch_artists(&self, query: &CatalogQuery) -> Result<Vec<Artist>, ProviderError> {
        let token = self.access_token().await?;
        let limit = query.limit.to_string();

        let response = self
            .http
            .get(self.search_url.clone())
            .bearer_auth(token)
            .query(&[
                ("q", query.query.as_str()),
                ("type", "artist"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.forget_token().await;
        }
        if !status.is_success() {
            let body = error_body(response).await;
            warn!(status = status.as_u16(), query = %query.query, "spotify search failed");
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: SearchResponse = response.json().await.map_err(malformed)?;
        let artists = artists_from_search(body);
        info!(query = %query.query, count = artists.len(), "fetched artists from spotify");
        Ok(artists)
    }
}

/// Resolves `path` below `base`, keeping any path prefix the base carries.
pub(crate) fn endpoint(base: &str, path: &str) -> Result<Url, url::ParseError> {
    let mut base = Url::parse(base)?;
    if !base.path().ends_with('/') {
        let dir = format!("{}/", base.path());
        base.set_path(&dir);
    }
    base.join(path)
}

async fn error_body(response: Response) -> String {
    response
        .text()
        .await
        .unwrap_or_default()
        .chars()
        .take(MAX_ERROR_BODY_CHARS)
        .collect()
}

fn malformed(err: reqwest::Error) -> ProviderError {
    if err.is_decode() {
        ProviderError::Malformed(err.to_string())
    } else {
        ProviderError::Http(err)
    }
}
