//! Telemetry and observability module
//!
//! Provides:
//! - Structured logging with tracing
//! - An in-process Prometheus registry for run counters

mod metrics;

pub use metrics::*;

use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::TelemetryConfig;
use crate::error::{SimulationError, SimulatorResult};

/// Initialize the telemetry subsystem
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_telemetry(config: &TelemetryConfig) -> SimulatorResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| SimulationError::Config(format!("Invalid log level '{}': {}", config.log_level, e)))?;

    let subscriber = tracing_subscriber::registry().with(env_filter);

    let result = if config.json_logs {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_file(true)
            .with_line_number(true)
            .with_thread_ids(true)
            .with_target(true);

        subscriber.with(json_layer).try_init()
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_file(false)
            .with_line_number(false)
            .with_target(true)
            .compact();

        subscriber.with(fmt_layer).try_init()
    };
    result.map_err(|e| SimulationError::Internal(format!("Failed to install subscriber: {}", e)))?;

    tracing::info!(
        service = %config.service_name,
        version = %env!("CARGO_PKG_VERSION"),
        "Telemetry initialized"
    );

    Ok(())
}

/// Log a completed HTTP-triggered run
#[inline]
pub fn log_run_served(request_id: &str, kind: &str, customers: usize, latency: Duration) {
    tracing::info!(
        request_id = %request_id,
        kind = %kind,
        customers = customers,
        latency_ms = latency.as_millis() as u64,
        "Simulation request completed"
    );
}

/// Log a failed HTTP-triggered run
#[inline]
pub fn log_run_error(request_id: &str, kind: &str, error: &SimulationError) {
    tracing::error!(
        request_id = %request_id,
        kind = %kind,
        error = %error,
        error_type = %error.error_type(),
        code = error.code(),
        "Simulation request failed"
    );
}
