use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Artist, ArtistId, GameId};

/// Events the presentation layer delivers to the running game.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum GameCommand {
    ChoiceMade {
        game_id: GameId,
        round: u32,
        artist_id: ArtistId,
    },
    Restart,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingView {
    pub challenger_a: Artist,
    pub challenger_b: Artist,
    /// The opponent was drawn from recycled supply after the pool ran dry.
    #[serde(default)]
    pub rematch: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameView {
    pub game_id: GameId,
    pub round: u32,
    pub total_rounds: u32,
    pub game_over: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub champion: Option<Artist>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pairing: Option<PairingView>,
    pub remaining_in_pool: usize,
    pub started_at: DateTime<Utc>,
}

impl GameView {
    pub fn choice(&self, artist: &Artist) -> GameCommand {
        GameCommand::ChoiceMade {
            game_id: self.game_id.clone(),
            round: self.round,
            artist_id: artist.id.clone(),
        }
    }
}
