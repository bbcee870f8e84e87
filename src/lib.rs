//! # Queue Simulator
//!
//! Discrete-event queueing simulator with two models:
//!
//! - **Single server**: customers pick a service from a catalog and queue
//!   behind earlier customers of the same service code. Produces an ordered
//!   list of arrival and departure events.
//! - **Able/Baker**: two parallel servers fed by inverse-transform sampling
//!   from an interarrival table and a service time table. Produces a
//!   per-customer table plus utilization and waiting time metrics.
//!
//! Runs are reproducible when seeded, and the same engine is exposed through
//! a library API, the `queue-sim` CLI and an HTTP server.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use queue_simulator::{SimulatorConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = SimulatorConfig::default();
//!     run_server(config).await
//! }
//! ```
//!
//! ```rust
//! use queue_simulator::engine::ParallelRunOptions;
//! use queue_simulator::probability::ProbabilityTable;
//! use queue_simulator::SimulationEngine;
//!
//! let arrivals = ProbabilityTable::from_weights("arrival", [(2.0, 1.0)]).unwrap();
//! let service = ProbabilityTable::from_weights("service", [(3.0, 1.0)]).unwrap();
//!
//! let engine = SimulationEngine::default_config();
//! let run = engine
//!     .run_parallel(&arrivals, &service, &ParallelRunOptions::default())
//!     .unwrap();
//! assert_eq!(run.report.total_customers, 30);
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod probability;
pub mod sampling;
pub mod server;
pub mod telemetry;
pub mod types;

pub use config::SimulatorConfig;
pub use engine::SimulationEngine;
pub use error::{SimulationError, SimulatorResult};
pub use server::run_server;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default server port
pub const DEFAULT_PORT: u16 = 8080;
