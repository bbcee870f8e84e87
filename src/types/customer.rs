//! Parallel-server customers and server state

use serde::{Deserialize, Serialize};
use std::fmt;

/// The two servers of the parallel model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ServerName {
    Able,
    Baker,
}

impl ServerName {
    /// Pool order; also the tie-break order
    pub const ALL: [ServerName; 2] = [ServerName::Able, ServerName::Baker];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Able => "Able",
            Self::Baker => "Baker",
        }
    }
}

impl fmt::Display for ServerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One customer of a parallel-server run. Times are in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParallelCustomerRecord {
    pub customer_id: u32,
    pub server: ServerName,
    pub arrival_time: f64,
    pub service_start: f64,
    pub wait_time: f64,
    pub service_duration: f64,
    pub end_time: f64,
    pub system_time: f64,
}

/// Run-scoped state of one server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerState {
    pub name: ServerName,
    pub available_from: f64,
    pub service_times_log: Vec<f64>,
}

impl ServerState {
    pub fn new(name: ServerName) -> Self {
        Self {
            name,
            available_from: 0.0,
            service_times_log: Vec::new(),
        }
    }

    pub fn is_free_at(&self, clock: f64) -> bool {
        self.available_from <= clock
    }

    /// Serve a customer arriving at `clock`; returns `(service_start, end_time)`
    pub fn serve(&mut self, clock: f64, duration: f64) -> (f64, f64) {
        let start = clock.max(self.available_from);
        let end = start + duration;
        self.available_from = end;
        self.service_times_log.push(duration);
        (start, end)
    }

    /// Sum of logged service durations
    pub fn busy_time(&self) -> f64 {
        self.service_times_log.iter().sum()
    }

    pub fn customers_served(&self) -> usize {
        self.service_times_log.len()
    }
}
