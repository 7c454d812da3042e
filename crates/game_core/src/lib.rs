//! Game rules for the Sound-Clash artist ladder.
//!
//! A shuffled [`ArtistPool`] feeds a running-champion ladder: round one pits
//! two fresh artists against each other, and every later round puts the
//! previous winner against one new opponent until the last round is decided.

pub mod pool;
pub mod session;
pub mod state;

pub use pool::{ArtistPool, Draw};
pub use session::GameSession;
pub use state::{
    player_chooses, setup_round, GameRules, GameState, Pairing, Phase, DEFAULT_MIN_ARTISTS,
    DEFAULT_TOTAL_ROUNDS,
};
