use std::sync::Arc;

use catalog::{ArtistProvider, CatalogQuery};
use chrono::{DateTime, Utc};
use shared::{
    domain::{ArtistId, GameId},
    error::GameError,
    protocol::{GameCommand, GameView, PairingView},
};
use tracing::{info, warn};

use crate::{
    pool::ArtistPool,
    state::{player_chooses, setup_round, GameRules, GameState},
};

/// The one running game: its state, its pool, and where to get artists from
/// when the player asks for another go.
pub struct GameSession {
    provider: Arc<dyn ArtistProvider>,
    query: CatalogQuery,
    rules: GameRules,
    game_id: GameId,
    started_at: DateTime<Utc>,
    state: GameState,
    pool: ArtistPool,
}

impl GameSession {
    pub async fn start(
        provider: Arc<dyn ArtistProvider>,
        query: CatalogQuery,
        rules: GameRules,
    ) -> Result<Self, GameError> {
        Self::start_seeded(provider, query, rules, rand::random()).await
    }

    pub async fn start_seeded(
        provider: Arc<dyn ArtistProvider>,
        query: CatalogQuery,
        rules: GameRules,
        seed: u64,
    ) -> Result<Self, GameError> {
        let (pool, state) = deal(provider.as_ref(), &query, rules, seed).await?;
        let game_id = GameId::random();
        info!(%game_id, remaining = pool.len(), "game started");
        Ok(Self {
            provider,
            query,
            rules,
            game_id,
            started_at: Utc::now(),
            state,
            pool,
        })
    }

    pub fn game_id(&self) -> &GameId {
        &self.game_id
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn rules(&self) -> GameRules {
        self.rules
    }

    pub async fn handle(&mut self, command: GameCommand) -> Result<GameView, GameError> {
        match command {
            GameCommand::ChoiceMade {
                game_id,
                round,
                artist_id,
            } => self.choose(&game_id, round, &artist_id),
            GameCommand::Restart => self.restart().await,
        }
    }

    pub fn choose(
        &mut self,
        game_id: &GameId,
        round: u32,
        artist_id: &ArtistId,
    ) -> Result<GameView, GameError> {
        if *game_id != self.game_id {
            return Err(GameError::StaleChoice);
        }
        if self.state.game_over {
            return Err(GameError::GameOver);
        }
        if round != self.state.round {
            return Err(GameError::StaleChoice);
        }
        let winner = self
            .state
            .pairing
            .as_ref()
            .and_then(|pairing| pairing.challenger(artist_id))
            .cloned()
            .ok_or_else(|| GameError::InvalidChoice(artist_id.clone()))?;

        let mut next = player_chooses(self.state.clone(), winner.clone());
        if next.game_over {
            info!(game_id = %self.game_id, champion = %winner.name, "champion crowned");
        } else {
            let pairing = setup_round(&next, &mut self.pool).inspect_err(|error| {
                warn!(game_id = %self.game_id, round = next.round, %error, "failed to set up round");
            })?;
            next.pairing = Some(pairing);
            info!(game_id = %self.game_id, round, winner = %winner.name, "round decided");
        }
        self.state = next;
        Ok(self.view())
    }

    /// Deals a fresh game from the (cached) catalog.
    ///
    /// On failure the current game is kept as it was.
    pub async fn restart(&mut self) -> Result<GameView, GameError> {
        let (pool, state) =
            deal(self.provider.as_ref(), &self.query, self.rules, rand::random()).await?;
        let previous = std::mem::replace(&mut self.game_id, GameId::random());
        self.started_at = Utc::now();
        self.pool = pool;
        self.state = state;
        info!(%previous, game_id = %self.game_id, "game restarted");
        Ok(self.view())
    }

    pub fn view(&self) -> GameView {
        GameView {
            game_id: self.game_id.clone(),
            round: self.state.round,
            total_rounds: self.state.total_rounds,
            game_over: self.state.game_over,
            champion: self.state.champion.clone(),
            pairing: self.state.pairing.as_ref().map(PairingView::from),
            remaining_in_pool: self.pool.len(),
            started_at: self.started_at,
        }
    }
}

async fn deal(
    provider: &dyn ArtistProvider,
    query: &CatalogQuery,
    rules: GameRules,
    seed: u64,
) -> Result<(ArtistPool, GameState), GameError> {
    let artists = provider.fetch_artists(query).await.map_err(|error| {
        warn!(%error, query = %query.query, "artist fetch failed");
        GameError::Provider(error.to_string())
    })?;
    let mut pool = ArtistPool::initialize(artists, rules.min_artists, seed)?;
    let mut state = GameState::new(rules.total_rounds);
    state.pairing = Some(setup_round(&state, &mut pool)?);
    Ok((pool, state))
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
