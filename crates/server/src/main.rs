use std::{net::SocketAddr, sync::Arc};

use anyhow::{bail, Context};
use axum::{
    routing::{get, post},
    Router,
};
use catalog::{ArtistProvider, CachedProvider, ClientCredentials, FileProvider, SpotifyProvider};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod config;
mod pages;

use app_state::AppState;
use config::{load_settings, CatalogSource, Settings};

/// Choice forms and commands are a few hundred bytes at most.
const MAX_BODY_BYTES: usize = 16 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = load_settings()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    settings.validate()?;
    let provider = build_provider(&settings)?;
    let state = AppState::new(provider, settings.catalog_query(), settings.rules());
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings
        .server_bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.server_bind))?;
    info!(
        %addr,
        source = ?settings.catalog_source,
        rounds = settings.total_rounds,
        "server listening"
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_provider(settings: &Settings) -> anyhow::Result<Arc<dyn ArtistProvider>> {
    let provider: Arc<dyn ArtistProvider> = match settings.catalog_source {
        CatalogSource::Spotify => {
            let (Some(client_id), Some(client_secret)) = (
                settings.spotify_client_id.clone(),
                settings.spotify_client_secret.clone(),
            ) else {
                bail!("spotify catalog needs client credentials");
            };
            let spotify = SpotifyProvider::with_endpoints(
                ClientCredentials {
                    client_id,
                    client_secret,
                },
                &settings.spotify_api_url,
                &settings.spotify_accounts_url,
            )
            .context("invalid spotify endpoint")?;
            Arc::new(CachedProvider::new(spotify))
        }
        CatalogSource::File => {
            let Some(path) = settings.artists_file.clone() else {
                bail!("file catalog needs an artists file");
            };
            Arc::new(CachedProvider::new(FileProvider::new(path)))
        }
    };
    Ok(provider)
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/", get(pages::index))
        .route("/choose", post(pages::choose))
        .route("/restart", post(pages::restart))
        .route("/api/game", get(api::get_game))
        .route("/api/game/events", post(api::post_event))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
