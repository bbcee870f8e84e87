//! Parallel-server (Able/Baker) event generator

use tracing::debug;

use crate::config::validate_period;
use crate::error::{SimulationError, SimulatorResult};
use crate::probability::ProbabilityTable;
use crate::sampling::RandomSource;
use crate::types::{ParallelCustomerRecord, ServerName, ServerState};

/// Result of a parallel generation pass, before metrics
#[derive(Debug, Clone, PartialEq)]
pub struct ParallelOutcome {
    pub customers: Vec<ParallelCustomerRecord>,
    pub servers: Vec<ServerState>,
}

/// Pick the server for a customer arriving at `clock`.
///
/// The first server in pool order that is free wins. When all are busy, the
/// one that frees up soonest wins, with ties going to the earlier server.
pub fn assign_server(servers: &[ServerState], clock: f64) -> usize {
    if let Some(idx) = servers.iter().position(|s| s.is_free_at(clock)) {
        return idx;
    }

    servers
        .iter()
        .enumerate()
        .fold(None::<(usize, f64)>, |best, (idx, s)| match best {
            Some((_, from)) if from <= s.available_from => best,
            _ => Some((idx, s.available_from)),
        })
        .map_or(0, |(idx, _)| idx)
}

/// Generates one parallel-server run
pub struct ParallelGenerator<'a> {
    arrivals: &'a ProbabilityTable,
    service_times: &'a ProbabilityTable,
    simulation_period: f64,
    max_customers: usize,
}

impl<'a> ParallelGenerator<'a> {
    pub fn new(arrivals: &'a ProbabilityTable, service_times: &'a ProbabilityTable) -> Self {
        Self {
            arrivals,
            service_times,
            simulation_period: 60.0,
            max_customers: 100_000,
        }
    }

    pub fn with_period(mut self, minutes: f64) -> Self {
        self.simulation_period = minutes;
        self
    }

    pub fn with_max_customers(mut self, max: usize) -> Self {
        self.max_customers = max;
        self
    }

    /// Check inputs before the loop starts
    fn preflight(&self) -> SimulatorResult<()> {
        if self.arrivals.is_empty() {
            return Err(SimulationError::EmptyProbabilityTable(self.arrivals.name().to_string()));
        }
        if self.service_times.is_empty() {
            return Err(SimulationError::EmptyProbabilityTable(
                self.service_times.name().to_string(),
            ));
        }
        if self.arrivals.keys().any(|k| k <= 0.0) {
            return Err(SimulationError::invalid_table(
                self.arrivals.name(),
                "time between arrivals must be greater than 0",
            ));
        }
        if self.service_times.keys().any(|k| k < 0.0) {
            return Err(SimulationError::invalid_table(
                self.service_times.name(),
                "service times cannot be negative",
            ));
        }
        validate_period(self.simulation_period)
    }

    /// Run until the arrival clock reaches the simulation period. The
    /// customer whose arrival crosses the period is still served.
    pub fn generate(&self, rng: &mut dyn RandomSource) -> SimulatorResult<ParallelOutcome> {
        self.preflight()?;

        let mut servers: Vec<ServerState> = ServerName::ALL.iter().copied().map(ServerState::new).collect();
        let mut customers = Vec::new();
        let mut clock = 0.0;

        while clock < self.simulation_period {
            if customers.len() >= self.max_customers {
                return Err(SimulationError::Validation {
                    message: format!(
                        "run exceeded {} customers before reaching {} minutes",
                        self.max_customers, self.simulation_period
                    ),
                    param: Some("parallel.max_customers".to_string()),
                });
            }

            let interarrival = self.arrivals.lookup(rng.next_unit())?.key;
            clock += interarrival;

            let idx = assign_server(&servers, clock);
            let duration = self.service_times.lookup(rng.next_unit())?.key;

            let server = &mut servers[idx];
            let (service_start, end_time) = server.serve(clock, duration);
            let record = ParallelCustomerRecord {
                customer_id: customers.len() as u32 + 1,
                server: server.name,
                arrival_time: clock,
                service_start,
                wait_time: service_start - clock,
                service_duration: duration,
                end_time,
                system_time: end_time - clock,
            };

            debug!(
                customer_id = record.customer_id,
                server = %record.server,
                arrival = record.arrival_time,
                wait = record.wait_time,
                "Assigned customer"
            );
            customers.push(record);
        }

        Ok(ParallelOutcome { customers, servers })
    }
}
