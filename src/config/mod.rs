//! Configuration module for the queue simulator
//!
//! Provides hierarchical configuration with support for:
//! - YAML/TOML/JSON config files
//! - Environment variable overrides
//! - Runtime reconfiguration
//! - Validation

mod simulation;

pub use simulation::*;

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use crate::catalog::ServiceCatalog;
use crate::error::{SimulationError, SimulatorResult};
use crate::probability::{ProbabilityTable, TableInput, WeightedValue};
use crate::types::ServiceRow;

/// Table name used for interarrival times
pub const ARRIVAL_TABLE: &str = "arrival";
/// Table name used for service times
pub const SERVICE_TABLE: &str = "service";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Telemetry settings
    pub telemetry: TelemetryConfig,
    /// Single-server generator settings
    pub single: SingleServerConfig,
    /// Parallel-server generator settings
    pub parallel: ParallelServerConfig,
    /// Services loaded into the catalog at startup
    pub catalog: Vec<ServiceRow>,
    /// Interarrival distribution for parallel runs
    pub arrival_table: TableInput,
    /// Service time distribution for parallel runs
    pub service_table: TableInput,
    /// Base seed for deterministic behavior (None = random)
    pub seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            telemetry: TelemetryConfig::default(),
            single: SingleServerConfig::default(),
            parallel: ParallelServerConfig::default(),
            catalog: demo_catalog(),
            arrival_table: weighted(&[(2.0, 0.25), (3.0, 0.40), (4.0, 0.20), (5.0, 0.15)]),
            service_table: weighted(&[(3.0, 0.30), (4.0, 0.28), (5.0, 0.25), (6.0, 0.17)]),
            seed: None,
        }
    }
}

fn demo_catalog() -> Vec<ServiceRow> {
    vec![
        ServiceRow::new("DEP", "Deposit", 4),
        ServiceRow::new("WDL", "Withdrawal", 3),
        ServiceRow::new("ACC", "Open Account", 6),
    ]
}

fn weighted(pairs: &[(f64, f64)]) -> TableInput {
    TableInput::Weighted(pairs.iter().copied().map(WeightedValue::from).collect())
}

impl SimulatorConfig {
    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> SimulatorResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| SimulationError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .map_err(|e| SimulationError::Config(format!("YAML parse error: {}", e)))?,
            Some("toml") => toml::from_str(&content)
                .map_err(|e| SimulationError::Config(format!("TOML parse error: {}", e)))?,
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| SimulationError::Config(format!("JSON parse error: {}", e)))?,
            _ => {
                return Err(SimulationError::Config(
                    "Unsupported config file format. Use .yaml, .toml, or .json".to_string(),
                ))
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn from_env() -> SimulatorResult<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `QUEUE_SIM_*` environment overrides on top of this configuration
    pub fn apply_env_overrides(&mut self) -> SimulatorResult<()> {
        if let Ok(port) = std::env::var("QUEUE_SIM_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| SimulationError::Config("Invalid port number".to_string()))?;
        }

        if let Ok(host) = std::env::var("QUEUE_SIM_HOST") {
            self.server.host = host;
        }

        if let Ok(seed) = std::env::var("QUEUE_SIM_SEED") {
            self.seed = Some(
                seed.parse()
                    .map_err(|_| SimulationError::Config("Invalid seed value".to_string()))?,
            );
        }

        if let Ok(period) = std::env::var("QUEUE_SIM_PERIOD_MINUTES") {
            self.parallel.simulation_period_minutes = period
                .parse()
                .map_err(|_| SimulationError::Config("Invalid simulation period".to_string()))?;
        }

        if let Ok(level) = std::env::var("QUEUE_SIM_LOG_LEVEL") {
            self.telemetry.log_level = level;
        }

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> SimulatorResult<()> {
        self.server.validate()?;
        self.single.validate()?;
        self.parallel.validate()?;

        self.build_catalog()
            .map_err(|e| SimulationError::Config(format!("Invalid catalog: {}", e)))?;
        self.build_arrival_table()
            .map_err(|e| SimulationError::Config(format!("Invalid arrival table: {}", e)))?;
        self.build_service_table()
            .map_err(|e| SimulationError::Config(format!("Invalid service table: {}", e)))?;

        Ok(())
    }

    /// Catalog described by the `catalog` rows
    pub fn build_catalog(&self) -> SimulatorResult<ServiceCatalog> {
        if self.catalog.is_empty() {
            return Ok(ServiceCatalog::new());
        }
        ServiceCatalog::from_rows(&self.catalog)
    }

    pub fn build_arrival_table(&self) -> SimulatorResult<ProbabilityTable> {
        build_table(ARRIVAL_TABLE, &self.arrival_table)
    }

    pub fn build_service_table(&self) -> SimulatorResult<ProbabilityTable> {
        build_table(SERVICE_TABLE, &self.service_table)
    }

    /// Create a minimal configuration with an empty catalog and quiet logging
    pub fn minimal() -> Self {
        Self {
            telemetry: TelemetryConfig {
                log_level: "warn".to_string(),
                ..Default::default()
            },
            catalog: Vec::new(),
            ..Default::default()
        }
    }

    /// Textbook Able/Baker setup: uniform 1-4 minute interarrivals
    pub fn classroom() -> Self {
        Self {
            arrival_table: weighted(&[(1.0, 0.25), (2.0, 0.25), (3.0, 0.25), (4.0, 0.25)]),
            service_table: weighted(&[(2.0, 0.30), (3.0, 0.28), (4.0, 0.25), (5.0, 0.17)]),
            ..Default::default()
        }
    }
}

/// An empty input yields an empty table rather than an error
fn build_table(name: &str, input: &TableInput) -> SimulatorResult<ProbabilityTable> {
    if input.is_empty() {
        return Ok(ProbabilityTable::empty(name));
    }
    ProbabilityTable::from_input(name, input)
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Maximum concurrent requests
    pub max_concurrent_requests: usize,
    /// Request timeout
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Enable CORS
    pub cors_enabled: bool,
    /// CORS allowed origins
    pub cors_origins: Vec<String>,
    /// Enable request logging
    pub request_logging: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_concurrent_requests: 1_000,
            request_timeout: Duration::from_secs(30),
            cors_enabled: true,
            cors_origins: vec!["*".to_string()],
            request_logging: true,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> SimulatorResult<()> {
        if self.port == 0 {
            return Err(SimulationError::Validation {
                message: "Port cannot be 0".to_string(),
                param: Some("server.port".to_string()),
            });
        }
        if self.max_concurrent_requests == 0 {
            return Err(SimulationError::Validation {
                message: "max_concurrent_requests must be greater than 0".to_string(),
                param: Some("server.max_concurrent_requests".to_string()),
            });
        }
        if self.request_timeout.is_zero() {
            return Err(SimulationError::Validation {
                message: "request_timeout must be greater than 0".to_string(),
                param: Some("server.request_timeout".to_string()),
            });
        }
        Ok(())
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> SimulatorResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| SimulationError::Config(format!("Invalid socket address: {}", e)))
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Enable telemetry
    pub enabled: bool,
    /// Log level
    pub log_level: String,
    /// Enable JSON logging
    pub json_logs: bool,
    /// Prometheus metrics endpoint path
    pub metrics_path: String,
    /// Service name for tracing
    pub service_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_level: "info".to_string(),
            json_logs: false,
            metrics_path: "/metrics".to_string(),
            service_name: "queue-simulator".to_string(),
        }
    }
}

/// Helper module for Duration serialization
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{}s", duration.as_secs()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    pub(super) fn parse_duration(s: &str) -> Result<Duration, String> {
        let s = s.trim();
        let invalid = |_| format!("Invalid duration: {}", s);
        if let Some(millis) = s.strip_suffix("ms") {
            millis.trim().parse::<u64>().map(Duration::from_millis).map_err(invalid)
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.trim().parse::<u64>().map(Duration::from_secs).map_err(invalid)
        } else if let Some(mins) = s.strip_suffix('m') {
            mins.trim()
                .parse::<u64>()
                .map(|m| Duration::from_secs(m * 60))
                .map_err(invalid)
        } else {
            s.parse::<u64>().map(Duration::from_secs).map_err(invalid)
        }
    }
}
