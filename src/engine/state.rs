//! Engine state and statistics tracking

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Which generator produced a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Single,
    Parallel,
}

/// Thread-safe counters across all runs of one engine
pub struct EngineState {
    single_runs: AtomicU64,
    parallel_runs: AtomicU64,
    failed_runs: AtomicU64,
    total_customers: AtomicU64,
    durations: RwLock<DurationTracker>,
}

impl EngineState {
    pub fn new() -> Self {
        Self {
            single_runs: AtomicU64::new(0),
            parallel_runs: AtomicU64::new(0),
            failed_runs: AtomicU64::new(0),
            total_customers: AtomicU64::new(0),
            durations: RwLock::new(DurationTracker::default()),
        }
    }

    /// Record a completed run
    pub fn record_run(&self, kind: RunKind, customers: usize, elapsed: Duration) {
        match kind {
            RunKind::Single => self.single_runs.fetch_add(1, Ordering::Relaxed),
            RunKind::Parallel => self.parallel_runs.fetch_add(1, Ordering::Relaxed),
        };
        self.total_customers
            .fetch_add(customers as u64, Ordering::Relaxed);
        self.durations.write().record(elapsed);
    }

    /// Record a run that failed before producing output
    pub fn record_failure(&self) {
        self.failed_runs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stats(&self) -> EngineStats {
        let single_runs = self.single_runs.load(Ordering::Relaxed);
        let parallel_runs = self.parallel_runs.load(Ordering::Relaxed);

        EngineStats {
            total_runs: single_runs + parallel_runs,
            single_runs,
            parallel_runs,
            failed_runs: self.failed_runs.load(Ordering::Relaxed),
            total_customers: self.total_customers.load(Ordering::Relaxed),
            run_time: self.durations.read().stats(),
        }
    }

    pub fn reset(&self) {
        self.single_runs.store(0, Ordering::Relaxed);
        self.parallel_runs.store(0, Ordering::Relaxed);
        self.failed_runs.store(0, Ordering::Relaxed);
        self.total_customers.store(0, Ordering::Relaxed);
        *self.durations.write() = DurationTracker::default();
    }
}

impl Default for EngineState {
    fn default() -> Self {
        Self::new()
    }
}

/// Engine statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineStats {
    pub total_runs: u64,
    pub single_runs: u64,
    pub parallel_runs: u64,
    pub failed_runs: u64,
    pub total_customers: u64,
    pub run_time: RunTimeStats,
}

impl EngineStats {
    /// Failed runs as a fraction of all attempts
    pub fn failure_rate(&self) -> f64 {
        let attempts = self.total_runs + self.failed_runs;
        if attempts == 0 {
            0.0
        } else {
            self.failed_runs as f64 / attempts as f64
        }
    }

    pub fn customers_per_run(&self) -> f64 {
        if self.total_runs == 0 {
            0.0
        } else {
            self.total_customers as f64 / self.total_runs as f64
        }
    }
}

/// Wall-clock time spent generating runs
#[derive(Debug, Default)]
struct DurationTracker {
    count: u64,
    sum: Duration,
    min: Option<Duration>,
    max: Option<Duration>,
}

impl DurationTracker {
    fn record(&mut self, elapsed: Duration) {
        self.count += 1;
        self.sum += elapsed;
        self.min = Some(self.min.map_or(elapsed, |m| m.min(elapsed)));
        self.max = Some(self.max.map_or(elapsed, |m| m.max(elapsed)));
    }

    fn stats(&self) -> RunTimeStats {
        if self.count == 0 {
            return RunTimeStats::default();
        }

        let to_ms = |d: Duration| d.as_secs_f64() * 1000.0;
        RunTimeStats {
            count: self.count,
            mean_ms: to_ms(self.sum) / self.count as f64,
            min_ms: self.min.map_or(0.0, to_ms),
            max_ms: self.max.map_or(0.0, to_ms),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunTimeStats {
    pub count: u64,
    pub mean_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}
