use shared::{
    domain::{Artist, ArtistId},
    error::GameError,
    protocol::PairingView,
};

use crate::pool::ArtistPool;

pub const DEFAULT_TOTAL_ROUNDS: u32 = 30;
/// Enough supply that rematches stay rare in a 30-round game.
pub const DEFAULT_MIN_ARTISTS: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameRules {
    pub total_rounds: u32,
    pub min_artists: usize,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            total_rounds: DEFAULT_TOTAL_ROUNDS,
            min_artists: DEFAULT_MIN_ARTISTS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingFirstPair,
    RoundInProgress,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pairing {
    pub challenger_a: Artist,
    pub challenger_b: Artist,
    pub rematch: bool,
}

impl Pairing {
    /// The challenger with this id, if it is one of the two.
    pub fn challenger(&self, id: &ArtistId) -> Option<&Artist> {
        [&self.challenger_a, &self.challenger_b]
            .into_iter()
            .find(|artist| artist.id == *id)
    }
}

impl From<&Pairing> for PairingView {
    fn from(value: &Pairing) -> Self {
        Self {
            challenger_a: value.challenger_a.clone(),
            challenger_b: value.challenger_b.clone(),
            rematch: value.rematch,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub round: u32,
    pub total_rounds: u32,
    pub champion: Option<Artist>,
    pub game_over: bool,
    pub pairing: Option<Pairing>,
}

impl GameState {
    pub fn new(total_rounds: u32) -> Self {
        Self {
            round: 1,
            total_rounds,
            champion: None,
            game_over: false,
            pairing: None,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.game_over {
            Phase::Finished
        } else if self.champion.is_none() && self.pairing.is_none() {
            Phase::AwaitingFirstPair
        } else {
            Phase::RoundInProgress
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(DEFAULT_TOTAL_ROUNDS)
    }
}

/// Picks the two artists for the current round.
///
/// The first round draws two fresh artists; every later round keeps the
/// champion and draws a single opponent for it.
pub fn setup_round(state: &GameState, pool: &mut ArtistPool) -> Result<Pairing, GameError> {
    match &state.champion {
        None => {
            let challenger_a = pool.draw_one()?;
            let challenger_b = pool.draw_one()?;
            Ok(Pairing {
                challenger_a,
                challenger_b,
                rematch: false,
            })
        }
        Some(champion) => {
            let draw = pool.draw_distinct_from(champion)?;
            Ok(Pairing {
                challenger_a: champion.clone(),
                challenger_b: draw.artist,
                rematch: draw.rematch,
            })
        }
    }
}

/// Records the player's pick and moves to the next round.
pub fn player_chooses(state: GameState, winner: Artist) -> GameState {
    let round = state.round + 1;
    GameState {
        round,
        champion: Some(winner),
        game_over: round > state.total_rounds,
        pairing: None,
        ..state
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
