//! Input shapes accepted when building a probability table

use serde::{Deserialize, Serialize};

/// A `(value, weight)` pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedValue {
    pub value: f64,
    pub weight: f64,
}

impl WeightedValue {
    pub fn new(value: f64, weight: f64) -> Self {
        Self { value, weight }
    }
}

impl From<(f64, f64)> for WeightedValue {
    fn from((value, weight): (f64, f64)) -> Self {
        Self { value, weight }
    }
}

/// One row of an arrival or server probability sheet
///
/// Accepts both the arrival headings (`Time Between Arrival`, `Probability`,
/// ...) and the server headings (`Service Time`, `Server Probability`, ...).
/// Digit columns are accepted but recomputed from the cumulative column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbabilityRowInput {
    #[serde(alias = "Time Between Arrival", alias = "Service Time")]
    pub key: f64,

    #[serde(alias = "Probability", alias = "Server Probability")]
    pub probability: f64,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "Accumulative Probability",
        alias = "Server Accumulative Probability"
    )]
    pub cumulative_probability: Option<f64>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "Digit Assignment From",
        alias = "Server Digit Assignment From"
    )]
    pub digit_from: Option<u32>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "Digit Assignment To",
        alias = "Server Digit Assignment To"
    )]
    pub digit_to: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none", alias = "Server No.")]
    pub server_no: Option<u32>,
}

impl ProbabilityRowInput {
    pub fn new(key: f64, probability: f64) -> Self {
        Self {
            key,
            probability,
            cumulative_probability: None,
            digit_from: None,
            digit_to: None,
            server_no: None,
        }
    }

    pub fn with_cumulative(mut self, cumulative: f64) -> Self {
        self.cumulative_probability = Some(cumulative);
        self
    }
}

/// Any of the accepted table encodings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TableInput {
    /// `[{value, weight}]`
    Weighted(Vec<WeightedValue>),
    /// Full probability rows
    Rows(Vec<ProbabilityRowInput>),
    /// Raw observed values, each weighted by its own magnitude
    Values(Vec<f64>),
}

impl TableInput {
    pub fn len(&self) -> usize {
        match self {
            Self::Weighted(v) => v.len(),
            Self::Rows(v) => v.len(),
            Self::Values(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TableInput {
    fn default() -> Self {
        Self::Weighted(Vec::new())
    }
}

impl From<Vec<WeightedValue>> for TableInput {
    fn from(pairs: Vec<WeightedValue>) -> Self {
        Self::Weighted(pairs)
    }
}
