//! Core simulation engine
//!
//! The [`SimulationEngine`] owns the configuration and run statistics and
//! hands every run its own random source:
//! - a request seed is used as-is,
//! - otherwise a configured base seed is offset by the run index,
//! - otherwise the run is seeded from entropy.
//!
//! The generators themselves are plain functions of their inputs plus a
//! `&mut dyn RandomSource`; the engine adds ids, timestamps, metrics and
//! logging around them.

mod parallel;
mod single;
mod state;

pub use parallel::*;
pub use single::*;
pub use state::*;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::catalog::ServiceCatalog;
use crate::config::SimulatorConfig;
use crate::error::{SimulationError, SimulatorResult};
use crate::metrics::{ParallelMetrics, SingleServerMetrics};
use crate::probability::ProbabilityTable;
use crate::sampling::{derive_seed, RandomSource, SeededSource};
use crate::types::{ParallelRun, SingleServerMode, SingleServerRun};

/// Per-run options for the single-server generator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleRunOptions {
    pub mode: Option<SingleServerMode>,
    pub seed: Option<u64>,
    pub simultaneous_arrivals: Option<bool>,
}

/// Per-run options for the parallel generator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParallelRunOptions {
    pub seed: Option<u64>,
    pub period_minutes: Option<f64>,
}

/// The main simulation engine
pub struct SimulationEngine {
    config: RwLock<SimulatorConfig>,
    state: EngineState,
    run_counter: AtomicU64,
    start_time: Instant,
}

impl SimulationEngine {
    /// Create a new simulation engine with the given configuration
    pub fn new(config: SimulatorConfig) -> Self {
        Self {
            config: RwLock::new(config),
            state: EngineState::new(),
            run_counter: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Create with default configuration
    pub fn default_config() -> Self {
        Self::new(SimulatorConfig::default())
    }

    /// Get current configuration
    pub fn config(&self) -> SimulatorConfig {
        self.config.read().clone()
    }

    /// Replace the configuration at runtime
    pub fn update_config(&self, config: SimulatorConfig) -> SimulatorResult<()> {
        config.validate()?;
        *self.config.write() = config;
        self.run_counter.store(0, Ordering::Relaxed);
        Ok(())
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn stats(&self) -> EngineStats {
        self.state.stats()
    }

    pub fn reset_stats(&self) {
        self.state.reset();
    }

    /// Random source for the next run, plus the seed it was built from
    pub fn next_source(&self, seed_override: Option<u64>) -> SeededSource {
        let run_index = self.run_counter.fetch_add(1, Ordering::Relaxed);
        let seed = seed_override.or_else(|| {
            self.config
                .read()
                .seed
                .map(|base| derive_seed(base, run_index))
        });
        SeededSource::from_seed_opt(seed)
    }

    /// Run the single-server generator against `catalog`
    pub fn run_single(
        &self,
        catalog: &ServiceCatalog,
        options: &SingleRunOptions,
    ) -> SimulatorResult<SingleServerRun> {
        let mut rng = self.next_source(options.seed);
        let seed = rng.seed();
        self.run_single_with(catalog, options, &mut rng)
            .map(|mut run| {
                run.seed = seed;
                run
            })
    }

    /// Same as [`Self::run_single`] with a caller-supplied random source
    pub fn run_single_with(
        &self,
        catalog: &ServiceCatalog,
        options: &SingleRunOptions,
        rng: &mut dyn RandomSource,
    ) -> SimulatorResult<SingleServerRun> {
        let start = Instant::now();
        let mut config = self.config.read().single.clone();
        if let Some(simultaneous) = options.simultaneous_arrivals {
            config.simultaneous_arrivals = simultaneous;
        }
        let mode = options.mode.unwrap_or(config.default_mode);

        let events = SingleServerGenerator::new(catalog, &config)
            .generate(mode, rng)
            .map_err(|e| self.fail("single", e))?;

        let run = SingleServerRun {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            seed: None,
            mode,
            metrics: SingleServerMetrics::compute(&events),
            events,
        };

        info!(
            run_id = %run.run_id,
            mode = %mode,
            customers = run.metrics.total_customers,
            events = run.events.len(),
            "Single-server run complete"
        );

        self.state
            .record_run(RunKind::Single, run.customer_count(), start.elapsed());
        Ok(run)
    }

    /// Run the parallel generator against the two tables
    pub fn run_parallel(
        &self,
        arrivals: &ProbabilityTable,
        service_times: &ProbabilityTable,
        options: &ParallelRunOptions,
    ) -> SimulatorResult<ParallelRun> {
        let mut rng = self.next_source(options.seed);
        let seed = rng.seed();
        self.run_parallel_with(arrivals, service_times, options, &mut rng)
            .map(|mut run| {
                run.seed = seed;
                run
            })
    }

    /// Same as [`Self::run_parallel`] with a caller-supplied random source
    pub fn run_parallel_with(
        &self,
        arrivals: &ProbabilityTable,
        service_times: &ProbabilityTable,
        options: &ParallelRunOptions,
        rng: &mut dyn RandomSource,
    ) -> SimulatorResult<ParallelRun> {
        let start = Instant::now();
        let config = self.config.read().parallel.clone();
        let period = options
            .period_minutes
            .unwrap_or(config.simulation_period_minutes);

        let outcome = ParallelGenerator::new(arrivals, service_times)
            .with_period(period)
            .with_max_customers(config.max_customers)
            .generate(rng)
            .map_err(|e| self.fail("parallel", e))?;

        let metrics = ParallelMetrics::compute(&outcome.customers, &outcome.servers, period);
        let run = ParallelRun {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            seed: None,
            simulation_period: period,
            report: metrics.to_report(),
            metrics,
            customers: outcome.customers,
            servers: outcome.servers,
        };

        info!(
            run_id = %run.run_id,
            customers = run.customers.len(),
            able_utilization = %run.report.able_utilization_rate,
            baker_utilization = %run.report.baker_utilization_rate,
            "Parallel run complete"
        );

        self.state
            .record_run(RunKind::Parallel, run.customer_count(), start.elapsed());
        Ok(run)
    }

    fn fail(&self, kind: &str, error: SimulationError) -> SimulationError {
        self.state.record_failure();
        warn!(kind = kind, error = %error, code = error.code(), "Simulation run failed");
        error
    }
}
