//! Weighted gem generation and seed derivation.

use gem_cascade_core::{ColorWeights, GemColor, GemSource, LevelId};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

/// Draws a color with probability proportional to its weight.
///
/// Uses cumulative-sum inversion over a single uniform sample. Weights that
/// are not positive and finite never win; the last usable color absorbs
/// rounding at the top of the range.
pub fn weighted_random_gem<R>(weights: &ColorWeights, rng: &mut R) -> GemColor
where
    R: Rng + ?Sized,
{
    let usable = |weight: f64| weight.is_finite() && weight > 0.0;
    let total: f64 = weights
        .as_slice()
        .iter()
        .copied()
        .filter(|weight| usable(*weight))
        .sum();

    let mut remaining = rng.gen::<f64>() * total;
    let mut fallback = 0;
    for (index, weight) in weights.as_slice().iter().copied().enumerate() {
        if !usable(weight) {
            continue;
        }
        if remaining < weight {
            return GemColor::new(index as u8);
        }
        remaining -= weight;
        fallback = index;
    }

    GemColor::new(fallback as u8)
}

/// [`GemSource`] backed by a random number generator.
#[derive(Clone, Debug)]
pub struct WeightedGemSource<R = ChaCha8Rng> {
    rng: R,
}

impl<R: Rng> WeightedGemSource<R> {
    /// Wraps an existing generator.
    #[must_use]
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl WeightedGemSource<ChaCha8Rng> {
    /// Creates a reproducible source from a seed.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> GemSource for WeightedGemSource<R> {
    fn draw(&mut self, weights: &ColorWeights) -> GemColor {
        weighted_random_gem(weights, &mut self.rng)
    }
}

/// Derives the seed for one attempt at a level from a global seed.
#[must_use]
pub fn derive_attempt_seed(global_seed: u64, level: LevelId, attempt: u32) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(global_seed.to_le_bytes());
    hasher.update(level.get().to_le_bytes());
    hasher.update(attempt.to_le_bytes());
    finalize_seed(hasher)
}

fn finalize_seed(hasher: Sha256) -> u64 {
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
