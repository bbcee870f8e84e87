//! Metrics derived from completed runs
//!
//! Parallel runs report server utilization, average waiting time and the
//! customer count as a flat key/value report. Single-server runs get the
//! per-customer aggregates plus the "customers in system" step series.

mod series;

pub use series::*;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{SimulationError, SimulatorResult};
use crate::types::{Event, ParallelCustomerRecord, ServerName, ServerState};

/// `min(busy, period) / period`, clamped to `[0, 1]`
pub fn utilization(server: &ServerState, simulation_period: f64) -> f64 {
    if simulation_period <= 0.0 {
        return 0.0;
    }
    (server.busy_time().min(simulation_period) / simulation_period).clamp(0.0, 1.0)
}

/// Mean wait across all customers
pub fn average_waiting_time(records: &[ParallelCustomerRecord]) -> SimulatorResult<f64> {
    mean(records.iter().map(|r| r.wait_time)).ok_or(SimulationError::NoCustomers)
}

/// Mean time in system across all customers
pub fn average_system_time(records: &[ParallelCustomerRecord]) -> SimulatorResult<f64> {
    mean(records.iter().map(|r| r.system_time)).ok_or(SimulationError::NoCustomers)
}

/// `0.75` -> `"75.00%"`
pub fn format_percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// `1.254` -> `"1.25 minutes"`
pub fn format_minutes(minutes: f64) -> String {
    format!("{:.2} minutes", minutes)
}

fn mean<I: Iterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Aggregates for a parallel-server run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParallelMetrics {
    pub total_customers: usize,
    pub simulation_period: f64,
    /// Fraction of the period Able was busy, in `[0, 1]`
    pub able_utilization: f64,
    pub baker_utilization: f64,
    pub average_waiting_time: f64,
    pub average_system_time: f64,
    pub average_service_time: f64,
    pub customers_who_waited: usize,
    pub able_customers: usize,
    pub baker_customers: usize,
}

impl ParallelMetrics {
    /// Compute from a completed run. Zero customers yields zero averages
    /// with a warning rather than an error.
    pub fn compute(
        records: &[ParallelCustomerRecord],
        servers: &[ServerState],
        simulation_period: f64,
    ) -> Self {
        let server = |name: ServerName| servers.iter().find(|s| s.name == name);

        let average_waiting_time = average_waiting_time(records).unwrap_or_else(|_| {
            warn!("No customers generated; reporting zero average waiting time");
            0.0
        });

        Self {
            total_customers: records.len(),
            simulation_period,
            able_utilization: server(ServerName::Able)
                .map_or(0.0, |s| utilization(s, simulation_period)),
            baker_utilization: server(ServerName::Baker)
                .map_or(0.0, |s| utilization(s, simulation_period)),
            average_waiting_time,
            average_system_time: average_system_time(records).unwrap_or(0.0),
            average_service_time: mean(records.iter().map(|r| r.service_duration)).unwrap_or(0.0),
            customers_who_waited: records.iter().filter(|r| r.wait_time > 0.0).count(),
            able_customers: records.iter().filter(|r| r.server == ServerName::Able).count(),
            baker_customers: records.iter().filter(|r| r.server == ServerName::Baker).count(),
        }
    }

    pub fn utilization_of(&self, name: ServerName) -> f64 {
        match name {
            ServerName::Able => self.able_utilization,
            ServerName::Baker => self.baker_utilization,
        }
    }

    pub fn to_report(&self) -> MetricsReport {
        MetricsReport {
            able_utilization_rate: format_percent(self.able_utilization),
            baker_utilization_rate: format_percent(self.baker_utilization),
            average_waiting_time: format_minutes(self.average_waiting_time),
            total_customers: self.total_customers,
        }
    }
}

/// Headline metrics as a flat key/value map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsReport {
    #[serde(rename = "Able Utilization Rate")]
    pub able_utilization_rate: String,
    #[serde(rename = "Baker Utilization Rate")]
    pub baker_utilization_rate: String,
    #[serde(rename = "Average Waiting Time")]
    pub average_waiting_time: String,
    #[serde(rename = "Total Customers")]
    pub total_customers: usize,
}

impl MetricsReport {
    /// Key/value pairs in display order
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Able Utilization Rate", self.able_utilization_rate.clone()),
            ("Baker Utilization Rate", self.baker_utilization_rate.clone()),
            ("Average Waiting Time", self.average_waiting_time.clone()),
            ("Total Customers", self.total_customers.to_string()),
        ]
    }
}

/// Aggregates for a single-server run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleServerMetrics {
    pub total_customers: usize,
    pub average_waiting_time: f64,
    pub average_system_time: f64,
    /// Fraction of customers with a non-zero wait
    pub probability_of_waiting: f64,
    /// Last departure time
    pub makespan: u32,
    /// Total service minutes per service code
    pub busy_time_by_service: BTreeMap<String, u64>,
}

impl SingleServerMetrics {
    pub fn compute(events: &[Event]) -> Self {
        let arrivals: Vec<_> = events
            .iter()
            .filter(|e| e.is_arrival())
            .map(Event::record)
            .collect();

        let mut busy_time_by_service = BTreeMap::new();
        for record in &arrivals {
            *busy_time_by_service
                .entry(record.service_code.clone())
                .or_insert(0) += u64::from(record.service_duration);
        }

        let total = arrivals.len();
        let waited = arrivals.iter().filter(|r| r.waiting_time > 0).count();

        Self {
            total_customers: total,
            average_waiting_time: mean(arrivals.iter().map(|r| r.waiting_time as f64))
                .unwrap_or(0.0),
            average_system_time: mean(
                arrivals.iter().map(|r| r.end_time.saturating_sub(r.clock_time) as f64),
            )
            .unwrap_or(0.0),
            probability_of_waiting: if total == 0 {
                0.0
            } else {
                waited as f64 / total as f64
            },
            makespan: events.iter().map(Event::end_time).max().unwrap_or(0),
            busy_time_by_service,
        }
    }
}
