use anyhow::{bail, Result};
use reqwest::{Client, Response};
use shared::{
    error::ApiError,
    protocol::{GameCommand, GameView},
};

/// Thin HTTP client for the game server's JSON API.
pub struct GameClient {
    http: Client,
    server_url: String,
}

impl GameClient {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            server_url: server_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn view(&self) -> Result<GameView> {
        let res = self
            .http
            .get(format!("{}/api/game", self.server_url))
            .send()
            .await?;
        decode(res).await
    }

    pub async fn send(&self, command: &GameCommand) -> Result<GameView> {
        let res = self
            .http
            .post(format!("{}/api/game/events", self.server_url))
            .json(command)
            .send()
            .await?;
        decode(res).await
    }
}

async fn decode(res: Response) -> Result<GameView> {
    let status = res.status();
    if status.is_success() {
        return Ok(res.json().await?);
    }
    match res.json::<ApiError>().await {
        Ok(err) => bail!("server rejected request ({status}): {}", err.message),
        Err(_) => bail!("server returned {status}"),
    }
}
