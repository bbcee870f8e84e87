//! Scripted random source for reproducing hand-worked examples

use std::collections::VecDeque;

use super::{RandomSource, SeededSource};

/// Replays queued draws, then falls back to a seeded source
///
/// Each kind of draw has its own queue, so a script only needs to list the
/// draws it cares about.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    units: VecDeque<f64>,
    ints: VecDeque<u32>,
    coins: VecDeque<bool>,
    picks: VecDeque<usize>,
    fallback: SeededSource,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self {
            units: VecDeque::new(),
            ints: VecDeque::new(),
            coins: VecDeque::new(),
            picks: VecDeque::new(),
            fallback: SeededSource::with_seed(0),
        }
    }

    /// Queue `[0, 1)` draws
    pub fn with_units(mut self, units: impl IntoIterator<Item = f64>) -> Self {
        self.units.extend(units);
        self
    }

    /// Queue integer draws. They are returned as-is, without range clamping.
    pub fn with_ints(mut self, ints: impl IntoIterator<Item = u32>) -> Self {
        self.ints.extend(ints);
        self
    }

    pub fn with_coins(mut self, coins: impl IntoIterator<Item = bool>) -> Self {
        self.coins.extend(coins);
        self
    }

    pub fn with_picks(mut self, picks: impl IntoIterator<Item = usize>) -> Self {
        self.picks.extend(picks);
        self
    }

    pub fn with_fallback_seed(mut self, seed: u64) -> Self {
        self.fallback = SeededSource::with_seed(seed);
        self
    }

    /// Number of scripted draws not yet consumed
    pub fn remaining(&self) -> usize {
        self.units.len() + self.ints.len() + self.coins.len() + self.picks.len()
    }
}

impl Default for ScriptedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for ScriptedSource {
    fn next_unit(&mut self) -> f64 {
        match self.units.pop_front() {
            Some(u) => u,
            None => self.fallback.next_unit(),
        }
    }

    fn int_inclusive(&mut self, low: u32, high: u32) -> u32 {
        match self.ints.pop_front() {
            Some(v) => v,
            None => self.fallback.int_inclusive(low, high),
        }
    }

    fn coin_flip(&mut self) -> bool {
        match self.coins.pop_front() {
            Some(c) => c,
            None => self.fallback.coin_flip(),
        }
    }

    fn pick_index(&mut self, len: usize) -> usize {
        match self.picks.pop_front() {
            Some(i) if i < len => i,
            Some(_) | None => self.fallback.pick_index(len),
        }
    }
}
