use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::BOARD_SIZE;

/// Source of the `RAND` draws of item scripts.
///
/// A seeded instance replays the same draws, an entropy-seeded one does not.
#[derive(Clone, Debug)]
pub struct ScriptRng {
    inner: ChaCha8Rng,
}

impl ScriptRng {
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            inner: ChaCha8Rng::from_entropy(),
        }
    }

    pub fn new(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }

    /// Uniform board coordinate in `[0, BOARD_SIZE)`.
    pub fn draw_coordinate(&mut self) -> i32 {
        self.inner.gen_range(0..BOARD_SIZE)
    }
}

impl Default for ScriptRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}
