use std::{collections::HashMap, fs, path::PathBuf, str::FromStr};

use anyhow::{bail, Context};
use catalog::{CatalogQuery, MAX_SEARCH_LIMIT, SPOTIFY_ACCOUNTS_URL, SPOTIFY_API_URL};
use game_core::{GameRules, DEFAULT_MIN_ARTISTS, DEFAULT_TOTAL_ROUNDS};
use url::Url;

const SETTINGS_FILE: &str = "server.toml";

/// Setting keys, as written in `server.toml` and, upper-cased behind `APP__`,
/// in the environment.
const KEYS: &[&str] = &[
    "bind_addr",
    "log_filter",
    "catalog_source",
    "spotify_client_id",
    "spotify_client_secret",
    "spotify_api_url",
    "spotify_accounts_url",
    "artists_file",
    "search_query",
    "search_limit",
    "total_rounds",
    "min_artists",
];

/// Plain environment names accepted before the `APP__` ones.
const ENV_ALIASES: &[(&str, &str)] = &[
    ("SERVER_BIND", "bind_addr"),
    ("SPOTIPY_CLIENT_ID", "spotify_client_id"),
    ("SPOTIFY_CLIENT_ID", "spotify_client_id"),
    ("SPOTIPY_CLIENT_SECRET", "spotify_client_secret"),
    ("SPOTIFY_CLIENT_SECRET", "spotify_client_secret"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource {
    Spotify,
    File,
}

impl FromStr for CatalogSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spotify" => Ok(Self::Spotify),
            "file" => Ok(Self::File),
            other => bail!("unknown catalog source '{other}' (expected 'spotify' or 'file')"),
        }
    }
}

#[derive(Debug)]
pub struct Settings {
    pub server_bind: String,
    pub log_filter: String,
    pub catalog_source: CatalogSource,
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,
    pub spotify_api_url: String,
    pub spotify_accounts_url: String,
    pub artists_file: Option<PathBuf>,
    pub search_query: String,
    pub search_limit: u32,
    pub total_rounds: u32,
    pub min_artists: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8080".into(),
            log_filter: "info".into(),
            catalog_source: CatalogSource::Spotify,
            spotify_client_id: None,
            spotify_client_secret: None,
            spotify_api_url: SPOTIFY_API_URL.into(),
            spotify_accounts_url: SPOTIFY_ACCOUNTS_URL.into(),
            artists_file: None,
            search_query: "a".into(),
            search_limit: MAX_SEARCH_LIMIT,
            total_rounds: DEFAULT_TOTAL_ROUNDS,
            min_artists: DEFAULT_MIN_ARTISTS,
        }
    }
}

impl Settings {
    pub fn rules(&self) -> GameRules {
        GameRules {
            total_rounds: self.total_rounds,
            min_artists: self.min_artists,
        }
    }

    pub fn catalog_query(&self) -> CatalogQuery {
        CatalogQuery::new(self.search_query.clone(), self.search_limit)
    }

    /// Overlays values from a flat `server.toml`. Unknown keys are ignored.
    pub fn apply_toml(&mut self, raw: &str) -> anyhow::Result<()> {
        let file_cfg: HashMap<String, toml::Value> =
            toml::from_str(raw).context("server.toml is not valid TOML")?;
        for (key, value) in &file_cfg {
            let value = match value {
                toml::Value::String(s) => s.clone(),
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                toml::Value::Table(_) => {
                    bail!("server.toml must be a flat key/value table; found table '{key}'")
                }
                other => bail!("unsupported value for '{key}': {other}"),
            };
            self.set(key, value).with_context(|| format!("in {SETTINGS_FILE}"))?;
        }
        Ok(())
    }

    /// Overlays environment values; `APP__` names win over the plain aliases.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        for &(var, key) in ENV_ALIASES {
            if let Some(v) = lookup(var) {
                self.set(key, v).with_context(|| format!("from {var}"))?;
            }
        }
        for &key in KEYS {
            let var = format!("APP__{}", key.to_ascii_uppercase());
            if let Some(v) = lookup(&var) {
                self.set(key, v).with_context(|| format!("from {var}"))?;
            }
        }
        Ok(())
    }

    fn set(&mut self, key: &str, value: String) -> anyhow::Result<()> {
        match key {
            "bind_addr" => self.server_bind = value,
            "log_filter" => self.log_filter = value,
            "catalog_source" => self.catalog_source = value.parse()?,
            "spotify_client_id" => self.spotify_client_id = non_empty(value),
            "spotify_client_secret" => self.spotify_client_secret = non_empty(value),
            "spotify_api_url" => self.spotify_api_url = value,
            "spotify_accounts_url" => self.spotify_accounts_url = value,
            "artists_file" => self.artists_file = non_empty(value).map(PathBuf::from),
            "search_query" => self.search_query = value,
            "search_limit" => self.search_limit = parse_number(key, &value)?,
            "total_rounds" => self.total_rounds = parse_number(key, &value)?,
            "min_artists" => self.min_artists = parse_number(key, &value)?,
            _ => {}
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        Url::parse(&self.spotify_api_url)
            .with_context(|| format!("invalid spotify_api_url '{}'", self.spotify_api_url))?;
        Url::parse(&self.spotify_accounts_url).with_context(|| {
            format!("invalid spotify_accounts_url '{}'", self.spotify_accounts_url)
        })?;
        if !(1..=MAX_SEARCH_LIMIT).contains(&self.search_limit) {
            bail!("search_limit must be between 1 and {MAX_SEARCH_LIMIT}");
        }
        if self.search_query.trim().is_empty() {
            bail!("search_query must not be empty");
        }
        if self.total_rounds == 0 {
            bail!("total_rounds must be at least 1");
        }
        if self.min_artists < 2 {
            bail!("min_artists must be at least 2");
        }
        match self.catalog_source {
            CatalogSource::Spotify => {
                if self.spotify_client_id.is_none() || self.spotify_client_secret.is_none() {
                    bail!("spotify catalog needs SPOTIPY_CLIENT_ID and SPOTIPY_CLIENT_SECRET");
                }
            }
            CatalogSource::File => {
                if self.artists_file.is_none() {
                    bail!("file catalog needs APP__ARTISTS_FILE");
                }
            }
        }
        Ok(())
    }
}

pub fn load_settings() -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(SETTINGS_FILE) {
        settings
            .apply_toml(&raw)
            .with_context(|| format!("failed to parse {SETTINGS_FILE}"))?;
    }
    settings.apply_env(|key| std::env::var(key).ok())?;

    Ok(settings)
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("invalid value for '{key}': '{value}'"))
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
