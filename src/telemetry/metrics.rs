//! Prometheus metrics implementation

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Process-wide metrics registry
///
/// Names may carry a Prometheus label set (`name{k="v"}`); the label set is
/// part of the key.
pub struct MetricsRegistry {
    counters: RwLock<BTreeMap<String, AtomicU64>>,
    gauges: RwLock<BTreeMap<String, AtomicU64>>,
    histograms: RwLock<BTreeMap<String, Histogram>>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            counters: RwLock::new(BTreeMap::new()),
            gauges: RwLock::new(BTreeMap::new()),
            histograms: RwLock::new(BTreeMap::new()),
        }
    }

    /// Increment a counter
    pub fn counter_inc(&self, name: &str, value: u64) {
        let counters = self.counters.read();
        if let Some(counter) = counters.get(name) {
            counter.fetch_add(value, Ordering::Relaxed);
        } else {
            drop(counters);
            let mut counters = self.counters.write();
            counters
                .entry(name.to_string())
                .or_insert_with(|| AtomicU64::new(0))
                .fetch_add(value, Ordering::Relaxed);
        }
    }

    /// Current counter value, 0 if never incremented
    pub fn counter_get(&self, name: &str) -> u64 {
        self.counters
            .read()
            .get(name)
            .map_or(0, |c| c.load(Ordering::Relaxed))
    }

    /// Set a gauge value
    pub fn gauge_set(&self, name: &str, value: u64) {
        let mut gauges = self.gauges.write();
        gauges
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .store(value, Ordering::Relaxed);
    }

    /// Record a histogram observation
    pub fn histogram_observe(&self, name: &str, value: f64) {
        let histograms = self.histograms.read();
        if let Some(hist) = histograms.get(name) {
            hist.observe(value);
        } else {
            drop(histograms);
            let mut histograms = self.histograms.write();
            histograms
                .entry(name.to_string())
                .or_insert_with(Histogram::new)
                .observe(value);
        }
    }

    /// Export metrics in Prometheus format
    pub fn export_prometheus(&self) -> String {
        let mut output = String::new();
        let mut typed = std::collections::HashSet::new();

        for (name, counter) in self.counters.read().iter() {
            let base = base_name(name);
            if typed.insert(base.to_string()) {
                output.push_str(&format!("# TYPE {} counter\n", base));
            }
            output.push_str(&format!("{} {}\n", name, counter.load(Ordering::Relaxed)));
        }

        for (name, gauge) in self.gauges.read().iter() {
            let base = base_name(name);
            if typed.insert(base.to_string()) {
                output.push_str(&format!("# TYPE {} gauge\n", base));
            }
            output.push_str(&format!("{} {}\n", name, gauge.load(Ordering::Relaxed)));
        }

        for (name, hist) in self.histograms.read().iter() {
            let stats = hist.stats();
            output.push_str(&format!("# TYPE {} histogram\n", name));
            for bucket in hist.buckets() {
                output.push_str(&format!(
                    "{}_bucket{{le=\"{}\"}} {}\n",
                    name,
                    bucket,
                    hist.count_below(*bucket)
                ));
            }
            output.push_str(&format!("{}_bucket{{le=\"+Inf\"}} {}\n", name, stats.count));
            output.push_str(&format!("{}_sum {}\n", name, stats.sum));
            output.push_str(&format!("{}_count {}\n", name, stats.count));
        }

        output
    }

    /// Reset all metrics
    pub fn reset(&self) {
        for counter in self.counters.write().values() {
            counter.store(0, Ordering::Relaxed);
        }
        for gauge in self.gauges.write().values() {
            gauge.store(0, Ordering::Relaxed);
        }
        self.histograms.write().clear();
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn base_name(name: &str) -> &str {
    name.split('{').next().unwrap_or(name)
}

const DEFAULT_BUCKETS: [f64; 11] = [0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0];
const CUSTOMER_BUCKETS: [f64; 8] = [1.0, 5.0, 10.0, 20.0, 50.0, 100.0, 1_000.0, 10_000.0];

/// Simple reservoir histogram
pub struct Histogram {
    values: RwLock<Vec<f64>>,
    sum: RwLock<f64>,
    count: AtomicU64,
    buckets: &'static [f64],
}

impl Histogram {
    const RESERVOIR: usize = 10_000;

    pub fn new() -> Self {
        Self::with_buckets(&DEFAULT_BUCKETS)
    }

    pub fn with_buckets(buckets: &'static [f64]) -> Self {
        Self {
            values: RwLock::new(Vec::new()),
            sum: RwLock::new(0.0),
            count: AtomicU64::new(0),
            buckets,
        }
    }

    pub fn observe(&self, value: f64) {
        let mut values = self.values.write();

        if values.len() < Self::RESERVOIR {
            values.push(value);
        } else {
            let idx = rand::random::<usize>() % values.len();
            values[idx] = value;
        }

        *self.sum.write() += value;
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn buckets(&self) -> &'static [f64] {
        self.buckets
    }

    pub fn count_below(&self, threshold: f64) -> u64 {
        self.values.read().iter().filter(|&&v| v <= threshold).count() as u64
    }

    pub fn stats(&self) -> HistogramStats {
        let values = self.values.read();
        let count = self.count.load(Ordering::Relaxed);

        if values.is_empty() {
            return HistogramStats::default();
        }

        let sum = *self.sum.read();
        let mut sorted = values.clone();
        sorted.sort_by(f64::total_cmp);

        let percentile = |p: f64| -> f64 {
            let idx = ((p / 100.0) * (sorted.len() - 1) as f64) as usize;
            sorted[idx.min(sorted.len() - 1)]
        };

        HistogramStats {
            count,
            sum,
            mean: sum / count as f64,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            p50: percentile(50.0),
            p90: percentile(90.0),
            p99: percentile(99.0),
        }
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

/// Histogram statistics
#[derive(Debug, Clone, Default)]
pub struct HistogramStats {
    pub count: u64,
    pub sum: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub p50: f64,
    pub p90: f64,
    pub p99: f64,
}

/// Pre-defined metric names
pub mod metric_names {
    // Run metrics
    pub const RUNS_TOTAL: &str = "queue_simulator_runs_total";
    pub const RUN_DURATION: &str = "queue_simulator_run_duration_seconds";
    pub const CUSTOMERS_TOTAL: &str = "queue_simulator_customers_total";
    pub const CUSTOMERS_PER_RUN: &str = "queue_simulator_customers_per_run";

    // Error metrics
    pub const ERRORS_TOTAL: &str = "queue_simulator_errors_total";

    // Workspace metrics
    pub const CATALOG_SERVICES: &str = "queue_simulator_catalog_services";
    pub const HTTP_REQUESTS_TOTAL: &str = "queue_simulator_http_requests_total";
}

/// Convenience functions for the simulator's metrics
pub struct SimulatorMetrics {
    registry: MetricsRegistry,
}

impl SimulatorMetrics {
    pub fn new() -> Self {
        let metrics = Self {
            registry: MetricsRegistry::new(),
        };
        metrics.set_catalog_size(0);
        metrics
    }

    /// Record a completed run of `kind` (`single` or `parallel`)
    pub fn record_run(&self, kind: &str, customers: usize, duration: Duration) {
        let key = format!("{}{{kind=\"{}\"}}", metric_names::RUNS_TOTAL, kind);
        self.registry.counter_inc(&key, 1);

        let key = format!("{}{{kind=\"{}\"}}", metric_names::CUSTOMERS_TOTAL, kind);
        self.registry.counter_inc(&key, customers as u64);

        {
            let mut histograms = self.registry.histograms.write();
            histograms
                .entry(metric_names::CUSTOMERS_PER_RUN.to_string())
                .or_insert_with(|| Histogram::with_buckets(&CUSTOMER_BUCKETS))
                .observe(customers as f64);
        }
        self.registry
            .histogram_observe(metric_names::RUN_DURATION, duration.as_secs_f64());
    }

    /// Record a failed run with its error code
    pub fn record_error(&self, kind: &str, code: &str) {
        let key = format!(
            "{}{{kind=\"{}\",code=\"{}\"}}",
            metric_names::ERRORS_TOTAL,
            kind,
            code
        );
        self.registry.counter_inc(&key, 1);
    }

    pub fn record_http_request(&self, route: &str, status: u16) {
        let key = format!(
            "{}{{route=\"{}\",status=\"{}\"}}",
            metric_names::HTTP_REQUESTS_TOTAL,
            route,
            status
        );
        self.registry.counter_inc(&key, 1);
    }

    pub fn set_catalog_size(&self, services: usize) {
        self.registry
            .gauge_set(metric_names::CATALOG_SERVICES, services as u64);
    }

    /// Runs recorded for `kind`
    pub fn runs(&self, kind: &str) -> u64 {
        self.registry
            .counter_get(&format!("{}{{kind=\"{}\"}}", metric_names::RUNS_TOTAL, kind))
    }

    /// Export metrics in Prometheus format
    pub fn export(&self) -> String {
        self.registry.export_prometheus()
    }

    /// Reset all metrics
    pub fn reset(&self) {
        self.registry.reset();
    }
}

impl Default for SimulatorMetrics {
    fn default() -> Self {
        Self::new()
    }
}
