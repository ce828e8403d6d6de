//! Injectable random source.
//!
//! Outcome draws (catch, interception) and small speed jitter are the
//! only randomness in a play. They all go through [`RandomSource`] so a
//! seeded generator reproduces a play exactly and tests can script the
//! draws.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of uniform draws in `[0, 1)`.
pub trait RandomSource {
    /// Next uniform draw in `[0, 1)`.
    fn next_f32(&mut self) -> f32;

    /// Uniform draw in `[low, high)`.
    fn range(&mut self, low: f32, high: f32) -> f32 {
        low + (high - low) * self.next_f32()
    }

    /// Bernoulli draw with probability `p` (0..=1).
    fn chance(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }
}

/// Seeded ChaCha generator; the default source for real plays.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    seed: u64,
    draws: u64,
    rng: ChaCha8Rng,
}

impl SeededRandom {
    /// Create a generator from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            draws: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Recreate a generator that has already produced `draws` values.
    #[must_use]
    pub fn resume(seed: u64, draws: u64) -> Self {
        let mut rng = Self::new(seed);
        for _ in 0..draws {
            rng.next_f32();
        }
        rng
    }

    /// Seed this generator was created with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Values drawn so far.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl Default for SeededRandom {
    fn default() -> Self {
        Self::new(0)
    }
}

impl RandomSource for SeededRandom {
    fn next_f32(&mut self) -> f32 {
        self.draws += 1;
        self.rng.gen::<f32>()
    }
}

/// Replays a fixed sequence of draws, cycling when exhausted.
///
/// An empty script always yields `0.5`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    values: Vec<f32>,
    cursor: usize,
}

impl ScriptedRandom {
    /// Create a scripted source from the draws it should return.
    #[must_use]
    pub fn new(values: Vec<f32>) -> Self {
        Self { values, cursor: 0 }
    }

    /// A source that always returns `value`.
    #[must_use]
    pub fn constant(value: f32) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f32(&mut self) -> f32 {
        if self.values.is_empty() {
            return 0.5;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value.clamp(0.0, 0.999_999)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_f32(&mut self) -> f32 {
        (**self).next_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = SeededRandom::new(42);
        let mut b = SeededRandom::new(42);
        for _ in 0..16 {
            assert_eq!(a.next_f32().to_bits(), b.next_f32().to_bits());
        }
    }

    #[test]
    fn test_resume_continues_sequence() {
        let mut original = SeededRandom::new(9);
        for _ in 0..5 {
            original.next_f32();
        }
        let mut resumed = SeededRandom::resume(9, original.draws());
        assert_eq!(resumed.draws(), 5);
        assert_eq!(original.next_f32().to_bits(), resumed.next_f32().to_bits());
    }

    #[test]
    fn test_seeded_in_unit_range() {
        let mut rng = SeededRandom::new(7);
        for _ in 0..256 {
            let v = rng.next_f32();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_scripted_cycles() {
        let mut rng = ScriptedRandom::new(vec![0.1, 0.9]);
        assert!((rng.next_f32() - 0.1).abs() < 1e-6);
        assert!((rng.next_f32() - 0.9).abs() < 1e-6);
        assert!((rng.next_f32() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_chance_uses_draw() {
        let mut low = ScriptedRandom::constant(0.05);
        assert!(low.chance(0.3));
        let mut high = ScriptedRandom::constant(0.95);
        assert!(!high.chance(0.3));
    }
}
