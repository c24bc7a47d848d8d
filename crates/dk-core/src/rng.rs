//! The world's shared deterministic random source.
//!
//! # Determinism strategy
//!
//! There is exactly one `SharedRandom` per world, seeded from
//! [`WorldConfig::seed`][crate::WorldConfig::seed] and passed by `&mut`
//! into every call that needs randomness.  All such calls happen inside the
//! single-threaded tick loop in a fixed actor order, so two runs with the
//! same seed and the same inputs draw exactly the same sequence.
//!
//! There is no ambient or thread-local generator: a call site that wants a
//! random choice must be handed the world's source explicitly.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Simulation-level RNG shared by every actor in a world.
pub struct SharedRandom {
    rng:   SmallRng,
    /// Number of draws taken so far.  Cheap replay-divergence diagnostic.
    draws: u64,
}

impl SharedRandom {
    pub fn new(seed: u64) -> Self {
        SharedRandom { rng: SmallRng::seed_from_u64(seed), draws: 0 }
    }

    /// Uniform integer in `0..n`.  Returns 0 when `n` is 0 without drawing.
    #[inline]
    pub fn next_below(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        self.draws += 1;
        self.rng.gen_range(0..n)
    }

    /// Choose one element uniformly from `slice`.
    /// Returns `None` (and draws nothing) if the slice is empty.
    #[inline]
    pub fn choose<T: Copy>(&mut self, slice: &[T]) -> Option<T> {
        if slice.is_empty() {
            return None;
        }
        let idx = self.next_below(slice.len());
        Some(slice[idx])
    }

    /// Total draws taken from this source.
    #[inline]
    pub fn draws(&self) -> u64 {
        self.draws
    }
}

impl std::fmt::Debug for SharedRandom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedRandom").field("draws", &self.draws).finish()
    }
}
