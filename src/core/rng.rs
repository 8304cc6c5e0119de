//! Deterministic, replayable randomness for one battle.
//!
//! Every random decision in move resolution (accuracy, hit counts,
//! secondary chances, random targets) draws from the battle's single
//! [`BattleRng`], so a fixed seed and a fixed action sequence always
//! produce the same log. [`BattleRng::state`] captures the stream position
//! for replay checkpoints.
//!
//! ```
//! use battle_actions::core::BattleRng;
//!
//! let mut a = BattleRng::new(7);
//! let mut b = BattleRng::new(7);
//! assert_eq!(a.random(100), b.random(100));
//! assert!(a.random_range(2, 6) >= 2);
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Seeded battle PRNG over a ChaCha8 stream.
#[derive(Clone, Debug)]
pub struct BattleRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl BattleRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { inner: ChaCha8Rng::seed_from_u64(seed), seed }
    }

    /// Uniform integer in `[0, n)`. Returns 0 when `n` is 0.
    pub fn random(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        self.inner.gen_range(0..n)
    }

    /// Uniform integer in `[low, high)`. Returns `low` for an empty range.
    pub fn random_range(&mut self, low: u32, high: u32) -> u32 {
        if high <= low {
            return low;
        }
        self.inner.gen_range(low..high)
    }

    /// True with probability `numerator / denominator`.
    pub fn random_chance(&mut self, numerator: u32, denominator: u32) -> bool {
        self.random(denominator) < numerator
    }

    /// Pick a uniformly random element.
    #[must_use]
    pub fn sample<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.random(items.len() as u32) as usize;
        items.get(index)
    }

    /// Pick an index with integer weights; `None` when every weight is zero.
    pub fn sample_weighted(&mut self, weights: &[u32]) -> Option<usize> {
        let total: u32 = weights.iter().sum();
        if total == 0 {
            return None;
        }

        let mut threshold = self.random(total);
        for (i, &weight) in weights.iter().enumerate() {
            if threshold < weight {
                return Some(i);
            }
            threshold -= weight;
        }
        None
    }

    /// Checkpoint of the stream position.
    #[must_use]
    pub fn state(&self) -> BattleRngState {
        BattleRngState { seed: self.seed, word_pos: self.inner.get_word_pos() }
    }

    /// Resume a stream from a checkpoint.
    #[must_use]
    pub fn from_state(state: &BattleRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self { inner, seed: state.seed }
    }
}

/// Where a battle's random stream stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleRngState {
    pub seed: u64,
    pub word_pos: u128,
}
