use std::sync::Arc;

use catalog::{ArtistProvider, CatalogQuery};
use game_core::{GameRules, GameSession};
use shared::{
    error::GameError,
    protocol::{GameCommand, GameView},
};
use tokio::sync::Mutex;

/// Shared by every handler. There is only ever one game, and the mutex makes
/// player choices apply one at a time.
pub(crate) struct AppState {
    provider: Arc<dyn ArtistProvider>,
    query: CatalogQuery,
    rules: GameRules,
    session: Mutex<Option<GameSession>>,
}

impl AppState {
    pub(crate) fn new(
        provider: Arc<dyn ArtistProvider>,
        query: CatalogQuery,
        rules: GameRules,
    ) -> Self {
        Self {
            provider,
            query,
            rules,
            session: Mutex::new(None),
        }
    }

    /// The current game, dealing a new one on first visit.
    pub(crate) async fn current_view(&self) -> Result<GameView, GameError> {
        let mut slot = self.session.lock().await;
        if let Some(session) = slot.as_ref() {
            return Ok(session.view());
        }
        let session = slot.insert(self.start_session().await?);
        Ok(session.view())
    }

    pub(crate) async fn dispatch(&self, command: GameCommand) -> Result<GameView, GameError> {
        let mut slot = self.session.lock().await;
        if let Some(session) = slot.as_mut() {
            return session.handle(command).await;
        }
        match command {
            GameCommand::Restart => {
                let session = slot.insert(self.start_session().await?);
                Ok(session.view())
            }
            // No game has been dealt yet, so the choice cannot be for it.
            GameCommand::ChoiceMade { .. } => Err(GameError::StaleChoice),
        }
    }

    async fn start_session(&self) -> Result<GameSession, GameError> {
        GameSession::start(self.provider.clone(), self.query.clone(), self.rules).await
    }
}
