//! Discrete empirical distributions and inverse-transform lookup
//!
//! A [`ProbabilityTable`] is an ordered list of rows whose cumulative
//! probabilities partition the unit interval. A uniform draw `u` is mapped to
//! the first row whose cumulative probability is at least `u`. Each row also
//! carries a digit range on the 1..=100 scale for hand simulation with random
//! digit tables.

mod input;

pub use input::*;

use serde::{Deserialize, Serialize};

use crate::error::{SimulationError, SimulatorResult};
use crate::sampling::RandomSource;

/// Slack allowed for sheets rounded to two decimals: between a supplied
/// cumulative value and the running sum, and for the column's final value
const CUMULATIVE_TOLERANCE: f64 = 0.011;

/// Top of the digit-assignment scale
pub const DIGIT_SCALE: u32 = 100;

/// One row of a probability table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbabilityRow {
    pub key: f64,
    pub probability: f64,
    pub cumulative_probability: f64,
    pub digit_from: u32,
    pub digit_to: u32,
}

impl ProbabilityRow {
    /// Whether the row owns at least one digit
    pub fn has_digits(&self) -> bool {
        self.digit_from <= self.digit_to
    }

    pub fn contains_digit(&self, digit: u32) -> bool {
        self.digit_from <= digit && digit <= self.digit_to
    }
}

/// An ordered discrete distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityTable {
    name: String,
    rows: Vec<ProbabilityRow>,
}

impl ProbabilityTable {
    /// Build from `(value, weight)` pairs; `probability = weight / Σweights`
    pub fn from_weights<I, W>(name: &str, pairs: I) -> SimulatorResult<Self>
    where
        I: IntoIterator<Item = W>,
        W: Into<WeightedValue>,
    {
        let pairs: Vec<WeightedValue> = pairs.into_iter().map(Into::into).collect();
        if pairs.is_empty() {
            return Err(SimulationError::EmptyProbabilityTable(name.to_string()));
        }

        for (idx, pair) in pairs.iter().enumerate() {
            if !pair.value.is_finite() {
                return Err(SimulationError::invalid_table(
                    name,
                    format!("row {} has a non-finite value", idx + 1),
                ));
            }
            if !pair.weight.is_finite() || pair.weight <= 0.0 {
                return Err(SimulationError::invalid_table(
                    name,
                    format!("row {} has weight {} (must be greater than 0)", idx + 1, pair.weight),
                ));
            }
        }

        let total: f64 = pairs.iter().map(|p| p.weight).sum();
        let probabilities = pairs.iter().map(|p| (p.value, p.weight / total));

        Ok(Self::assemble(name, probabilities))
    }

    /// Build from raw observed values, each weighted by its own magnitude
    pub fn from_values(name: &str, values: &[f64]) -> SimulatorResult<Self> {
        Self::from_weights(name, values.iter().map(|&v| WeightedValue::new(v, v)))
    }

    /// Build from probability-sheet rows, validating the cumulative column
    ///
    /// A sheet on the 0-100 scale is normalized to 0-1. Missing cumulative
    /// values are filled with the running sum; supplied ones must agree with
    /// the row's probability and strictly increase. Digit ranges are
    /// recomputed.
    pub fn from_rows(name: &str, rows: &[ProbabilityRowInput]) -> SimulatorResult<Self> {
        if rows.is_empty() {
            return Err(SimulationError::EmptyProbabilityTable(name.to_string()));
        }

        let percent_scale = rows.iter().any(|r| {
            r.probability > 1.0 + f64::EPSILON
                || r.cumulative_probability.map_or(false, |c| c > 1.0 + f64::EPSILON)
        });
        let scale = if percent_scale { 100.0 } else { 1.0 };

        let mut pairs = Vec::with_capacity(rows.len());
        let mut running = 0.0;
        let mut previous_cumulative = 0.0;

        for (idx, row) in rows.iter().enumerate() {
            let probability = row.probability / scale;
            if !row.key.is_finite() {
                return Err(SimulationError::invalid_table(
                    name,
                    format!("row {} has a non-finite key", idx + 1),
                ));
            }
            if !(probability > 0.0 && probability <= 1.0) {
                return Err(SimulationError::invalid_table(
                    name,
                    format!("row {} has probability {} outside (0, 1]", idx + 1, row.probability),
                ));
            }

            running += probability;
            let cumulative = row.cumulative_probability.map_or(running, |c| c / scale);
            let step = cumulative - previous_cumulative;
            if step <= f64::EPSILON {
                return Err(SimulationError::invalid_table(
                    name,
                    format!("row {} cumulative probability does not increase", idx + 1),
                ));
            }
            if (step - probability).abs() > CUMULATIVE_TOLERANCE {
                return Err(SimulationError::invalid_table(
                    name,
                    format!(
                        "row {} probability {} disagrees with its cumulative step {}",
                        idx + 1,
                        row.probability,
                        step * scale
                    ),
                ));
            }
            previous_cumulative = cumulative;
            pairs.push((row.key, cumulative));
        }

        if (previous_cumulative - 1.0).abs() > CUMULATIVE_TOLERANCE {
            return Err(SimulationError::invalid_table(
                name,
                format!("cumulative probability ends at {} instead of 1.0", previous_cumulative),
            ));
        }

        // Re-derive per-row probabilities from the validated cumulative column
        let mut last = 0.0;
        let probabilities: Vec<(f64, f64)> = pairs
            .into_iter()
            .map(|(key, cumulative)| {
                let p = cumulative - last;
                last = cumulative;
                (key, p)
            })
            .collect();

        Ok(Self::assemble(name, probabilities))
    }

    /// Build from any accepted input encoding
    pub fn from_input(name: &str, input: &TableInput) -> SimulatorResult<Self> {
        match input {
            TableInput::Weighted(pairs) => Self::from_weights(name, pairs.iter().copied()),
            TableInput::Rows(rows) => Self::from_rows(name, rows),
            TableInput::Values(values) => Self::from_values(name, values),
        }
    }

    /// An empty table; lookups and generation against it fail
    pub fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            rows: Vec::new(),
        }
    }

    /// Running cumulative sum plus digit ranges. The final row is pinned to
    /// cumulative 1.0 and digit 100, and takes whatever probability is left,
    /// so rounding error never leaks into the totals.
    fn assemble<I>(name: &str, probabilities: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let probabilities: Vec<(f64, f64)> = probabilities.into_iter().collect();
        let last_idx = probabilities.len().saturating_sub(1);

        let mut rows = Vec::with_capacity(probabilities.len());
        let mut cumulative = 0.0;
        let mut previous_to = 0u32;

        for (idx, (key, mut probability)) in probabilities.into_iter().enumerate() {
            if idx == last_idx {
                probability = 1.0 - cumulative;
            }
            cumulative += probability;

            let digit_from = previous_to + 1;
            let digit_to = if idx == last_idx {
                cumulative = 1.0;
                DIGIT_SCALE
            } else {
                let rounded = (cumulative * DIGIT_SCALE as f64).round() as u32;
                rounded.clamp(previous_to, DIGIT_SCALE)
            };

            rows.push(ProbabilityRow {
                key,
                probability,
                cumulative_probability: cumulative.min(1.0),
                digit_from,
                digit_to,
            });
            previous_to = digit_to;
        }

        Self {
            name: name.to_string(),
            rows,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> &[ProbabilityRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row keys in table order
    pub fn keys(&self) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().map(|r| r.key)
    }

    /// Lazy scan over the rows that satisfy `cumulativeProbability >= u`
    pub fn candidates(&self, u: f64) -> impl Iterator<Item = &ProbabilityRow> + '_ {
        self.rows
            .iter()
            .filter(move |r| r.cumulative_probability >= u)
    }

    /// Inverse-transform lookup: the first row whose cumulative probability
    /// is at least `u`
    pub fn lookup(&self, u: f64) -> SimulatorResult<&ProbabilityRow> {
        if !(0.0..=1.0).contains(&u) {
            return Err(SimulationError::InvalidDraw(u));
        }
        if self.rows.is_empty() {
            return Err(SimulationError::EmptyProbabilityTable(self.name.clone()));
        }

        self.candidates(u)
            .next()
            .ok_or_else(|| SimulationError::NoMatchingEntry {
                table: self.name.clone(),
                draw: u,
            })
    }

    /// Random-digit lookup on the 1..=100 scale
    pub fn lookup_digit(&self, digit: u32) -> SimulatorResult<&ProbabilityRow> {
        if !(1..=DIGIT_SCALE).contains(&digit) {
            return Err(SimulationError::InvalidDraw(digit as f64));
        }
        if self.rows.is_empty() {
            return Err(SimulationError::EmptyProbabilityTable(self.name.clone()));
        }

        self.rows
            .iter()
            .find(|r| r.contains_digit(digit))
            .ok_or_else(|| SimulationError::NoMatchingEntry {
                table: self.name.clone(),
                draw: digit as f64 / DIGIT_SCALE as f64,
            })
    }

    /// Draw a key from the table
    pub fn sample(&self, rng: &mut dyn RandomSource) -> SimulatorResult<f64> {
        let u = rng.next_unit();
        self.lookup(u).map(|row| row.key)
    }

    /// `Σ key × probability`
    pub fn expected_value(&self) -> f64 {
        self.rows.iter().map(|r| r.key * r.probability).sum()
    }

    /// Check the construction invariants; useful for tables deserialized
    /// directly rather than built through a constructor
    pub fn validate(&self) -> SimulatorResult<()> {
        let Some(last) = self.rows.last() else {
            return Err(SimulationError::EmptyProbabilityTable(self.name.clone()));
        };

        let mut previous = 0.0;
        for (idx, row) in self.rows.iter().enumerate() {
            if row.cumulative_probability + f64::EPSILON < previous {
                return Err(SimulationError::invalid_table(
                    &self.name,
                    format!("row {} cumulative probability decreases", idx + 1),
                ));
            }
            previous = row.cumulative_probability;
        }

        if (last.cumulative_probability - 1.0).abs() > f64::EPSILON {
            return Err(SimulationError::invalid_table(
                &self.name,
                "last row must have cumulative probability 1.0",
            ));
        }
        if last.digit_to != DIGIT_SCALE {
            return Err(SimulationError::invalid_table(
                &self.name,
                "last row must end at digit 100",
            ));
        }

        Ok(())
    }
}
