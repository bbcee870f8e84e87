//! CLI module for the queue simulator
//!
//! Subcommands for:
//! - Running single-server and parallel-server simulations
//! - Inspecting the configured catalog and probability tables
//! - Starting the HTTP server
//! - Managing configuration
//! - Health checking remote instances

mod commands;

pub use commands::*;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::VERSION;

/// Queue Simulator: discrete-event single-server and Able/Baker simulations
#[derive(Parser, Debug)]
#[command(name = "queue-sim")]
#[command(version = VERSION)]
#[command(about = "Discrete-event queueing simulator with single-server and Able/Baker models")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Global configuration file path (YAML, TOML, or JSON)
    #[arg(short, long, global = true, env = "QUEUE_SIM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Global log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "QUEUE_SIM_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Enable JSON log output
    #[arg(long, global = true, env = "QUEUE_SIM_JSON_LOGS")]
    pub json_logs: bool,

    /// Quiet mode - suppress banner and non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the simulator server
    #[command(alias = "s")]
    Serve(ServeCommand),

    /// Run a simulation and print the result
    #[command(alias = "sim")]
    Simulate(SimulateCommand),

    /// Show the configured catalog or probability tables
    Inspect(InspectCommand),

    /// Configuration management
    #[command(alias = "cfg")]
    Config(ConfigCommand),

    /// Health check a running instance
    Health(HealthCommand),

    /// Show version and build information
    Version,
}

/// Output format for simulation results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

/// Start the simulator server
#[derive(Parser, Debug)]
pub struct ServeCommand {
    /// Port to listen on
    #[arg(short, long, env = "QUEUE_SIM_PORT")]
    pub port: Option<u16>,

    /// Host to bind to
    #[arg(long, env = "QUEUE_SIM_HOST")]
    pub host: Option<String>,

    /// Base seed for deterministic runs
    #[arg(long, env = "QUEUE_SIM_SEED")]
    pub seed: Option<u64>,

    /// Default simulation period for parallel runs, in minutes
    #[arg(long, env = "QUEUE_SIM_PERIOD_MINUTES")]
    pub period: Option<f64>,

    /// Maximum concurrent requests
    #[arg(long, env = "QUEUE_SIM_MAX_CONCURRENT")]
    pub max_concurrent: Option<usize>,

    /// Request timeout in seconds
    #[arg(long, env = "QUEUE_SIM_TIMEOUT")]
    pub timeout: Option<u64>,
}

/// Run a simulation
#[derive(Parser, Debug)]
pub struct SimulateCommand {
    #[command(subcommand)]
    pub action: SimulateAction,
}

#[derive(Subcommand, Debug)]
pub enum SimulateAction {
    /// Single-server run over the service catalog
    Single {
        /// Attach arrival/completion probabilities and use admission draws
        #[arg(long)]
        probability: bool,

        /// Seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,

        /// Every customer advances the clock
        #[arg(long)]
        no_simultaneous: bool,

        /// Print events ordered by clock time
        #[arg(long)]
        sorted: bool,

        /// Service catalog file (YAML or JSON rows) instead of the configured one
        #[arg(long)]
        services: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Able/Baker run over the arrival and service tables
    Parallel {
        /// Seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,

        /// Simulation period in minutes
        #[arg(long)]
        period: Option<f64>,

        /// Interarrival table file instead of the configured one
        #[arg(long)]
        arrival: Option<PathBuf>,

        /// Service time table file instead of the configured one
        #[arg(long)]
        service: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

/// Inspect configured inputs
#[derive(Parser, Debug)]
pub struct InspectCommand {
    #[arg(value_enum)]
    pub target: InspectTarget,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InspectTarget {
    /// Service catalog
    Catalog,
    /// Interarrival probability table
    Arrival,
    /// Service time probability table
    Service,
}

/// Configuration management
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output format (yaml, toml, json)
        #[arg(short, long, default_value = "yaml")]
        format: String,
    },

    /// Validate configuration file
    Validate {
        /// Configuration file to validate
        file: PathBuf,
    },

    /// Initialize a new configuration file
    Init {
        /// Output file path
        #[arg(short, long, default_value = "queue-sim.yaml")]
        output: PathBuf,

        /// Configuration preset (minimal, standard, classroom)
        #[arg(short, long, default_value = "standard")]
        preset: String,

        /// Force overwrite existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show environment variable mappings
    Env,
}

/// Health check a running instance
#[derive(Parser, Debug)]
pub struct HealthCommand {
    /// Base URL of the simulator instance
    #[arg(short, long, default_value = "http://localhost:8080")]
    pub url: String,

    /// Timeout in seconds
    #[arg(short, long, default_value = "5")]
    pub timeout: u64,

    /// Check readiness instead of liveness
    #[arg(short, long)]
    pub ready: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}
