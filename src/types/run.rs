//! Completed simulation runs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Event, ParallelCustomerRecord, ServerState, SingleServerMode};
use crate::metrics::{MetricsReport, ParallelMetrics, SingleServerMetrics};

/// Output of one single-server run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleServerRun {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub mode: SingleServerMode,
    /// Events in generation order
    pub events: Vec<Event>,
    pub metrics: SingleServerMetrics,
}

impl SingleServerRun {
    pub fn customer_count(&self) -> usize {
        self.metrics.total_customers
    }
}

/// Output of one parallel-server run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParallelRun {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub simulation_period: f64,
    pub customers: Vec<ParallelCustomerRecord>,
    pub servers: Vec<ServerState>,
    pub metrics: ParallelMetrics,
    /// Flat key/value view of the headline metrics
    pub report: MetricsReport,
}

impl ParallelRun {
    pub fn customer_count(&self) -> usize {
        self.customers.len()
    }
}

/// Either kind of run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimulationRun {
    Single(SingleServerRun),
    Parallel(ParallelRun),
}

impl SimulationRun {
    pub fn run_id(&self) -> Uuid {
        match self {
            Self::Single(r) => r.run_id,
            Self::Parallel(r) => r.run_id,
        }
    }

    pub fn customer_count(&self) -> usize {
        match self {
            Self::Single(r) => r.customer_count(),
            Self::Parallel(r) => r.customer_count(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Single(_) => "single",
            Self::Parallel(_) => "parallel",
        }
    }
}

impl From<SingleServerRun> for SimulationRun {
    fn from(run: SingleServerRun) -> Self {
        Self::Single(run)
    }
}

impl From<ParallelRun> for SimulationRun {
    fn from(run: ParallelRun) -> Self {
        Self::Parallel(run)
    }
}
