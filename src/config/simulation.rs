//! Generator settings

use serde::{Deserialize, Serialize};

use crate::error::{SimulationError, SimulatorResult};
use crate::types::SingleServerMode;

/// Single-server generator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SingleServerConfig {
    /// Mode used when a request does not name one
    pub default_mode: SingleServerMode,
    /// Plain mode customer count range (inclusive)
    pub min_customers: u32,
    pub max_customers: u32,
    /// Candidate arrivals considered in probability mode
    pub candidate_ceiling: u32,
    /// Chance each candidate is admitted in probability mode
    pub admission_probability: f64,
    /// Constant completion probability stamped on probability events
    pub completion_probability: f64,
    /// Interarrival range in minutes (inclusive)
    pub min_interarrival: u32,
    pub max_interarrival: u32,
    /// Allow a customer to arrive at the same instant as the previous one
    pub simultaneous_arrivals: bool,
}

impl Default for SingleServerConfig {
    fn default() -> Self {
        Self {
            default_mode: SingleServerMode::Plain,
            min_customers: 5,
            max_customers: 10,
            candidate_ceiling: 20,
            admission_probability: 0.6,
            completion_probability: 0.8,
            min_interarrival: 1,
            max_interarrival: 3,
            simultaneous_arrivals: true,
        }
    }
}

impl SingleServerConfig {
    pub fn validate(&self) -> SimulatorResult<()> {
        if self.min_customers == 0 || self.min_customers > self.max_customers {
            return Err(SimulationError::Validation {
                message: format!(
                    "customer range [{}, {}] is invalid",
                    self.min_customers, self.max_customers
                ),
                param: Some("single.min_customers".to_string()),
            });
        }
        if self.candidate_ceiling == 0 {
            return Err(SimulationError::Validation {
                message: "candidate_ceiling must be greater than 0".to_string(),
                param: Some("single.candidate_ceiling".to_string()),
            });
        }
        for (name, p) in [
            ("single.admission_probability", self.admission_probability),
            ("single.completion_probability", self.completion_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(SimulationError::Validation {
                    message: format!("{} must be between 0.0 and 1.0", p),
                    param: Some(name.to_string()),
                });
            }
        }
        if self.min_interarrival > self.max_interarrival {
            return Err(SimulationError::Validation {
                message: format!(
                    "interarrival range [{}, {}] is invalid",
                    self.min_interarrival, self.max_interarrival
                ),
                param: Some("single.min_interarrival".to_string()),
            });
        }
        Ok(())
    }
}

/// Parallel-server generator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelServerConfig {
    /// Simulated horizon in minutes
    pub simulation_period_minutes: f64,
    /// Hard cap on customers per run
    pub max_customers: usize,
}

impl Default for ParallelServerConfig {
    fn default() -> Self {
        Self {
            simulation_period_minutes: 60.0,
            max_customers: 100_000,
        }
    }
}

impl ParallelServerConfig {
    pub fn validate(&self) -> SimulatorResult<()> {
        validate_period(self.simulation_period_minutes)?;
        if self.max_customers == 0 {
            return Err(SimulationError::Validation {
                message: "max_customers must be greater than 0".to_string(),
                param: Some("parallel.max_customers".to_string()),
            });
        }
        Ok(())
    }
}

/// A simulation period must be a positive, finite number of minutes
pub fn validate_period(minutes: f64) -> SimulatorResult<()> {
    if !minutes.is_finite() || minutes <= 0.0 {
        return Err(SimulationError::Validation {
            message: format!("simulation period {} must be a positive number of minutes", minutes),
            param: Some("parallel.simulation_period_minutes".to_string()),
        });
    }
    Ok(())
}
