use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use shared::{domain::Artist, error::GameError};
use tracing::debug;

/// Result of drawing an opponent for the reigning champion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draw {
    pub artist: Artist,
    /// Drawn from recycled supply, so the champion may have seen it before.
    pub rematch: bool,
}

/// The shuffled supply of challengers for one game, consumed from the back.
#[derive(Debug, Clone)]
pub struct ArtistPool {
    remaining: Vec<Artist>,
    spent: Vec<Artist>,
    recycles: u32,
    rng: ChaCha8Rng,
}

impl ArtistPool {
    /// Builds the pool from a provider result.
    ///
    /// Artists without an image are dropped first; the remainder must hold at
    /// least `min_artists` entries.
    pub fn initialize(
        raw_artists: Vec<Artist>,
        min_artists: usize,
        seed: u64,
    ) -> Result<Self, GameError> {
        let mut remaining: Vec<Artist> = raw_artists.into_iter().filter(Artist::has_image).collect();
        if remaining.len() < min_artists {
            return Err(GameError::InsufficientData {
                found: remaining.len(),
                required: min_artists,
            });
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        remaining.shuffle(&mut rng);
        Ok(Self {
            remaining,
            spent: Vec::new(),
            recycles: 0,
            rng,
        })
    }

    pub fn len(&self) -> usize {
        self.remaining.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    /// How many times spent artists were put back because the pool ran dry.
    pub fn recycles(&self) -> u32 {
        self.recycles
    }

    pub fn draw_one(&mut self) -> Result<Artist, GameError> {
        let artist = self.remaining.pop().ok_or(GameError::PoolExhausted)?;
        self.spent.push(artist.clone());
        Ok(artist)
    }

    /// Draws until the artist differs from `excluded`.
    ///
    /// An empty pool is refilled from spent artists (a forced rematch). If the
    /// only thing left to draw is `excluded` itself, it is returned rather
    /// than failing the round.
    pub fn draw_distinct_from(&mut self, excluded: &Artist) -> Result<Draw, GameError> {
        let mut refilled_this_draw = false;
        if self.remaining.is_empty() {
            self.recycle();
            refilled_this_draw = true;
        }

        let mut candidate = self.draw_one()?;
        while candidate.id == excluded.id {
            if self.remaining.is_empty() {
                if refilled_this_draw {
                    break;
                }
                self.recycle();
                refilled_this_draw = true;
            }
            candidate = self.draw_one()?;
        }

        Ok(Draw {
            artist: candidate,
            rematch: self.recycles > 0,
        })
    }

    fn recycle(&mut self) {
        self.remaining.append(&mut self.spent);
        self.remaining.shuffle(&mut self.rng);
        self.recycles += 1;
        debug!(
            artists = self.remaining.len(),
            recycles = self.recycles,
            "artist pool exhausted; recycling spent artists"
        );
    }
}

#[cfg(test)]
#[path = "tests/pool_tests.rs"]
mod tests;
