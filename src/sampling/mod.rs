//! Random sources for the simulation generators
//!
//! Every generator entry point takes a `&mut dyn RandomSource` so a run can be
//! seeded, replayed or scripted from tests. No generator reaches for a
//! thread-local or global RNG.

mod script;

pub use script::*;

use rand::prelude::*;
use rand_distr::{Distribution, Uniform};

/// Source of the random draws a simulation run consumes
pub trait RandomSource {
    /// Uniform draw in `[0, 1)`
    fn next_unit(&mut self) -> f64;

    /// Uniform integer in `[low, high]` (inclusive on both ends)
    fn int_inclusive(&mut self, low: u32, high: u32) -> u32;

    /// Fair coin flip
    fn coin_flip(&mut self) -> bool;

    /// Uniform index in `[0, len)`; `len` must be non-zero
    fn pick_index(&mut self, len: usize) -> usize;
}

/// Random source backed by a `StdRng`
#[derive(Debug, Clone)]
pub struct SeededSource {
    rng: StdRng,
    seed: Option<u64>,
}

impl SeededSource {
    /// Create a source seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            seed: None,
        }
    }

    /// Create a source with a fixed seed for reproducibility
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// Create from an optional seed, falling back to entropy
    pub fn from_seed_opt(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self::with_seed(s),
            None => Self::new(),
        }
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

impl Default for SeededSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for SeededSource {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn int_inclusive(&mut self, low: u32, high: u32) -> u32 {
        if low >= high {
            return low;
        }
        Uniform::new_inclusive(low, high).sample(&mut self.rng)
    }

    fn coin_flip(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }

    fn pick_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        Uniform::new(0, len).sample(&mut self.rng)
    }
}

/// Derive the seed for the `run_index`-th run from a base seed
#[inline]
pub fn derive_seed(base: u64, run_index: u64) -> u64 {
    base.wrapping_add(run_index)
}

/// Round to two decimal places
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
