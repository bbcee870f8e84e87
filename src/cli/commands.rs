//! CLI command implementations

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::catalog::ServiceCatalog;
use crate::config::{ARRIVAL_TABLE, SERVICE_TABLE};
use crate::engine::{ParallelRunOptions, SingleRunOptions};
use crate::metrics::{chronological, format_minutes, format_percent, peak_customers_in_system};
use crate::probability::{ProbabilityTable, TableInput};
use crate::types::{ParallelRun, ServiceRow, SingleServerMode, SingleServerRun};
use crate::{SimulationEngine, SimulatorConfig, VERSION};

use super::{
    Cli, Commands, ConfigAction, ConfigCommand, HealthCommand, InspectCommand, InspectTarget,
    OutputFormat, ServeCommand, SimulateAction, SimulateCommand,
};

/// Execute the CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let mut config = load_config(&cli)?;

    if let Some(level) = &cli.log_level {
        config.telemetry.log_level = level.clone();
    }
    config.telemetry.json_logs |= cli.json_logs;

    match cli.command {
        Commands::Serve(cmd) => execute_serve(cmd, config, cli.quiet).await,
        Commands::Simulate(cmd) => execute_simulate(cmd, config),
        Commands::Inspect(cmd) => execute_inspect(cmd, &config),
        Commands::Config(cmd) => execute_config(cmd, config),
        Commands::Health(cmd) => execute_health(cmd).await,
        Commands::Version => execute_version(),
    }
}

/// File configuration gets `QUEUE_SIM_*` overrides applied on top
fn load_config(cli: &Cli) -> Result<SimulatorConfig> {
    match &cli.config {
        Some(path) => {
            let mut config = SimulatorConfig::from_file(path)
                .with_context(|| format!("Failed to load configuration from {:?}", path))?;
            config.apply_env_overrides()?;
            config.validate()?;
            Ok(config)
        }
        None => Ok(SimulatorConfig::from_env()?),
    }
}

/// Execute the serve command
async fn execute_serve(cmd: ServeCommand, mut config: SimulatorConfig, quiet: bool) -> Result<()> {
    if let Some(port) = cmd.port {
        config.server.port = port;
    }
    if let Some(host) = cmd.host {
        config.server.host = host;
    }
    if let Some(seed) = cmd.seed {
        config.seed = Some(seed);
    }
    if let Some(period) = cmd.period {
        config.parallel.simulation_period_minutes = period;
    }
    if let Some(max_concurrent) = cmd.max_concurrent {
        config.server.max_concurrent_requests = max_concurrent;
    }
    if let Some(timeout) = cmd.timeout {
        config.server.request_timeout = Duration::from_secs(timeout);
    }

    config.validate().context("Configuration validation failed")?;

    if !quiet {
        print_banner(&config);
    }

    crate::run_server(config).await
}

/// Execute the simulate command
fn execute_simulate(cmd: SimulateCommand, config: SimulatorConfig) -> Result<()> {
    match cmd.action {
        SimulateAction::Single {
            probability,
            seed,
            no_simultaneous,
            sorted,
            services,
            format,
        } => {
            let catalog = match services {
                Some(path) => {
                    let rows: Vec<ServiceRow> = read_structured(&path)?;
                    ServiceCatalog::from_rows(&rows)
                        .with_context(|| format!("Invalid service catalog in {:?}", path))?
                }
                None => config.build_catalog()?,
            };

            let options = SingleRunOptions {
                mode: probability.then_some(SingleServerMode::Probability),
                seed,
                simultaneous_arrivals: no_simultaneous.then_some(false),
            };

            let engine = SimulationEngine::new(config);
            let mut run = engine.run_single(&catalog, &options)?;
            if sorted {
                run.events = chronological(&run.events);
            }

            match format {
                OutputFormat::Table => print!("{}", render_single_run(&run)),
                _ => print_structured(&run, format)?,
            }
            Ok(())
        }

        SimulateAction::Parallel {
            seed,
            period,
            arrival,
            service,
            format,
        } => {
            let arrivals = match arrival {
                Some(path) => load_table(ARRIVAL_TABLE, &path)?,
                None => config.build_arrival_table()?,
            };
            let service_times = match service {
                Some(path) => load_table(SERVICE_TABLE, &path)?,
                None => config.build_service_table()?,
            };

            let options = ParallelRunOptions {
                seed,
                period_minutes: period,
            };

            let engine = SimulationEngine::new(config);
            let run = engine.run_parallel(&arrivals, &service_times, &options)?;

            match format {
                OutputFormat::Table => print!("{}", render_parallel_run(&run)),
                _ => print_structured(&run, format)?,
            }
            Ok(())
        }
    }
}

/// Execute the inspect command
fn execute_inspect(cmd: InspectCommand, config: &SimulatorConfig) -> Result<()> {
    match cmd.target {
        InspectTarget::Catalog => {
            let catalog = config.build_catalog()?;
            match cmd.format {
                OutputFormat::Table => print!("{}", render_catalog(&catalog)),
                format => print_structured(&catalog, format)?,
            }
        }
        InspectTarget::Arrival | InspectTarget::Service => {
            let table = if cmd.target == InspectTarget::Arrival {
                config.build_arrival_table()?
            } else {
                config.build_service_table()?
            };
            match cmd.format {
                OutputFormat::Table => print!("{}", render_probability_table(&table)),
                format => print_structured(&table, format)?,
            }
        }
    }
    Ok(())
}

/// Execute the config command
fn execute_config(cmd: ConfigCommand, config: SimulatorConfig) -> Result<()> {
    match cmd.action {
        ConfigAction::Show { format } => {
            let output = match format.as_str() {
                "toml" => toml::to_string_pretty(&config)?,
                "json" => serde_json::to_string_pretty(&config)?,
                _ => serde_yaml::to_string(&config)?,
            };
            println!("{}", output);
            Ok(())
        }

        ConfigAction::Validate { file } => {
            let config = SimulatorConfig::from_file(&file)?;
            println!("Configuration at {:?} is valid", file);
            println!("  Services:       {}", config.catalog.len());
            println!("  Arrival rows:   {}", config.arrival_table.len());
            println!("  Service rows:   {}", config.service_table.len());
            println!("  Period:         {} minutes", config.parallel.simulation_period_minutes);
            println!(
                "  Seed:           {}",
                config.seed.map_or("random".to_string(), |s| s.to_string())
            );
            Ok(())
        }

        ConfigAction::Init { output, preset, force } => {
            if output.exists() && !force {
                bail!("File {:?} already exists. Use --force to overwrite.", output);
            }

            let config = match preset.as_str() {
                "minimal" => SimulatorConfig::minimal(),
                "classroom" => SimulatorConfig::classroom(),
                "standard" => SimulatorConfig::default(),
                other => bail!("Unknown preset '{}'. Use minimal, standard or classroom.", other),
            };

            let yaml = serde_yaml::to_string(&config)?;
            std::fs::write(&output, &yaml)
                .with_context(|| format!("Failed to write {:?}", output))?;
            println!("Created configuration file: {:?}", output);
            println!("Preset: {}", preset);
            Ok(())
        }

        ConfigAction::Env => {
            println!("Environment Variable Mappings:");
            println!();
            for (name, description) in ENV_VARS {
                println!("  {:<30} {}", name, description);
            }
            Ok(())
        }
    }
}

const ENV_VARS: &[(&str, &str)] = &[
    ("QUEUE_SIM_CONFIG", "Configuration file path"),
    ("QUEUE_SIM_PORT", "Server port (default: 8080)"),
    ("QUEUE_SIM_HOST", "Server host (default: 0.0.0.0)"),
    ("QUEUE_SIM_SEED", "Base random seed for reproducible runs"),
    ("QUEUE_SIM_PERIOD_MINUTES", "Parallel simulation period (default: 60)"),
    ("QUEUE_SIM_LOG_LEVEL", "Log level (trace/debug/info/warn/error)"),
    ("QUEUE_SIM_JSON_LOGS", "Enable JSON log format"),
    ("QUEUE_SIM_MAX_CONCURRENT", "Max concurrent requests"),
    ("QUEUE_SIM_TIMEOUT", "Request timeout (seconds)"),
    ("RUST_LOG", "Overrides the log level filter"),
];

/// Execute the health command
async fn execute_health(cmd: HealthCommand) -> Result<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(cmd.timeout))
        .build()?;

    let endpoint = if cmd.ready { "ready" } else { "health" };
    let url = format!("{}/{}", cmd.url.trim_end_matches('/'), endpoint);
    let start = Instant::now();

    let response = match client.get(&url).send().await {
        Ok(response) => response,
        Err(e) => {
            if cmd.format == "json" {
                let result = serde_json::json!({ "url": url, "error": e.to_string() });
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("✗ {} - Error: {}", url, e);
            }
            bail!("Health check failed: {}", e);
        }
    };

    let latency = start.elapsed();
    let status = response.status();
    let body: serde_json::Value = response.json().await.unwrap_or_default();

    if cmd.format == "json" {
        let result = serde_json::json!({
            "url": url,
            "status": status.as_u16(),
            "latency_ms": latency.as_millis() as u64,
            "response": body,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        let mark = if status.is_success() { "✓" } else { "✗" };
        println!("{} {} - Status: {} - Latency: {:?}", mark, url, status.as_u16(), latency);
        if let Some(health_status) = body.get("status") {
            println!("  Health: {}", health_status);
        }
    }

    if status.is_success() {
        Ok(())
    } else {
        bail!("Health check failed with status {}", status)
    }
}

fn execute_version() -> Result<()> {
    println!("queue-sim {}", VERSION);
    println!();
    println!("Build Information:");
    println!("  Version:       {}", VERSION);
    println!("  Rust Version:  {}", env!("CARGO_PKG_RUST_VERSION"));
    println!();
    println!("Models:");
    println!("  Single server, one queue per service code");
    println!("  Able/Baker parallel servers with inverse-transform sampling");
    Ok(())
}

// Helper functions

fn print_banner(config: &SimulatorConfig) {
    println!("Queue Simulator v{}", VERSION);
    println!();
    println!("Configuration:");
    println!("  • Server:    {}:{}", config.server.host, config.server.port);
    println!("  • Services:  {} configured", config.catalog.len());
    println!("  • Period:    {} minutes", config.parallel.simulation_period_minutes);
    println!(
        "  • Seed:      {}",
        config.seed.map_or("random".to_string(), |s| s.to_string())
    );
    println!();
    println!("Endpoints:");
    let base = format!("http://{}:{}", config.server.host, config.server.port);
    println!("  • Services:  {}/v1/services", base);
    println!("  • Tables:    {}/v1/tables", base);
    println!("  • Single:    {}/v1/simulations/single", base);
    println!("  • Parallel:  {}/v1/simulations/parallel", base);
    println!("  • Health:    {}/health", base);
    println!("  • Metrics:   {}/metrics", base);
    println!();
}

/// Read a YAML or JSON file, picking the parser by extension
pub fn read_structured<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {:?}", path))?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(&content).with_context(|| format!("Invalid YAML in {:?}", path))
        }
        Some("json") => {
            serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {:?}", path))
        }
        _ => bail!("Unsupported file format for {:?}. Use .yaml or .json", path),
    }
}

fn load_table(name: &str, path: &Path) -> Result<ProbabilityTable> {
    let input: TableInput = read_structured(path)?;
    ProbabilityTable::from_input(name, &input)
        .with_context(|| format!("Invalid {} table in {:?}", name, path))
}

fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<()> {
    let output = match format {
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
        _ => serde_json::to_string_pretty(value)?,
    };
    println!("{}", output);
    Ok(())
}

/// Event table followed by the run metrics
pub fn render_single_run(run: &SingleServerRun) -> String {
    let probability = run.mode == SingleServerMode::Probability;

    let mut header = format!(
        "{:>8} {:<10} {:>6} {:<6} {:<20} {:>8} {:>6} {:>6}",
        "CUSTOMER", "EVENT", "CLOCK", "CODE", "TITLE", "DURATION", "END", "WAIT"
    );
    if probability {
        header.push_str(&format!(" {:>9} {:>10}", "ARRIVAL P", "COMPLETE P"));
    }
    let mut lines = vec![header, "-".repeat(if probability { 100 } else { 79 })];

    for event in &run.events {
        let r = event.record();
        let mut line = format!(
            "{:>8} {:<10} {:>6} {:<6} {:<20} {:>8} {:>6} {:>6}",
            r.customer_id,
            r.event_type.to_string(),
            r.clock_time,
            r.service_code,
            truncate(&r.service_title, 20),
            r.service_duration,
            r.end_time,
            r.waiting_time
        );
        if let (Some(arrival), Some(completion)) =
            (event.arrival_probability(), event.completion_probability())
        {
            line.push_str(&format!(" {:>9.2} {:>10.2}", arrival, completion));
        }
        lines.push(line);
    }

    let m = &run.metrics;
    lines.extend([
        String::new(),
        format!("Total Customers:          {}", m.total_customers),
        format!("Average Waiting Time:     {}", format_minutes(m.average_waiting_time)),
        format!("Average Time in System:   {}", format_minutes(m.average_system_time)),
        format!("Probability of Waiting:   {}", format_percent(m.probability_of_waiting)),
        format!("Last Departure:           {}", m.makespan),
        format!("Peak Customers in System: {}", peak_customers_in_system(&run.events)),
    ]);
    join_lines(lines)
}

/// Customer table followed by the metrics report
pub fn render_parallel_run(run: &ParallelRun) -> String {
    let mut lines = vec![
        format!(
            "{:>8} {:<6} {:>8} {:>8} {:>8} {:>8} {:>8} {:>9}",
            "CUSTOMER", "SERVER", "ARRIVAL", "START", "WAIT", "SERVICE", "END", "IN SYSTEM"
        ),
        "-".repeat(72),
    ];

    lines.extend(run.customers.iter().map(|c| {
        format!(
            "{:>8} {:<6} {:>8.2} {:>8.2} {:>8.2} {:>8.2} {:>8.2} {:>9.2}",
            c.customer_id,
            c.server.as_str(),
            c.arrival_time,
            c.service_start,
            c.wait_time,
            c.service_duration,
            c.end_time,
            c.system_time
        )
    }));

    lines.push(String::new());
    lines.extend(
        run.report
            .entries()
            .into_iter()
            .map(|(key, value)| format!("{:<24} {}", format!("{}:", key), value)),
    );
    join_lines(lines)
}

pub fn render_catalog(catalog: &ServiceCatalog) -> String {
    let mut lines = vec![
        format!("{:<10} {:<30} {:>8}", "CODE", "TITLE", "DURATION"),
        "-".repeat(50),
    ];
    lines.extend(catalog.iter().map(|service| {
        format!(
            "{:<10} {:<30} {:>8}",
            service.code,
            truncate(&service.title, 30),
            service.duration
        )
    }));
    join_lines(lines)
}

pub fn render_probability_table(table: &ProbabilityTable) -> String {
    let mut lines = vec![
        format!("Table: {}", table.name()),
        format!(
            "{:>8} {:>12} {:>12} {:>10}",
            "VALUE", "PROBABILITY", "CUMULATIVE", "DIGITS"
        ),
        "-".repeat(45),
    ];
    lines.extend(table.rows().iter().map(|row| {
        format!(
            "{:>8} {:>12.2} {:>12.2} {:>10}",
            row.key,
            row.probability,
            row.cumulative_probability,
            format!("{:02}-{:02}", row.digit_from, row.digit_to)
        )
    }));
    lines.push(format!("Expected value: {:.2}", table.expected_value()));
    join_lines(lines)
}

/// One line per entry, newline-terminated
fn join_lines(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(max.saturating_sub(1)).collect();
        t.push('…');
        t
    }
}
