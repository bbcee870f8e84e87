//! HTTP request handlers

use std::collections::HashMap;
use std::time::Instant;

use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use super::middleware::RequestId;
use super::state::AppState;
use crate::catalog::ServiceCatalog;
use crate::config::{ARRIVAL_TABLE, SERVICE_TABLE};
use crate::engine::{EngineStats, ParallelRunOptions, SingleRunOptions};
use crate::error::{SimulationError, SimulatorResult};
use crate::metrics::chronological;
use crate::probability::{ProbabilityTable, TableInput};
use crate::telemetry::{log_run_error, log_run_served};
use crate::types::{ParallelRun, Service, ServiceRow, SimulationRun, SingleServerMode, SingleServerRun};

// ============== Catalog Handlers ==============

/// GET /v1/services
pub async fn list_services(State(state): State<AppState>) -> Json<Vec<Service>> {
    Json(state.workspace.read().catalog.iter().cloned().collect())
}

/// POST /v1/services
pub async fn add_service(
    State(state): State<AppState>,
    Json(row): Json<ServiceRow>,
) -> Result<(StatusCode, Json<Service>), SimulationError> {
    let mut workspace = state.workspace.write();
    let service = workspace
        .catalog
        .add_service(&row.code, &row.title, row.duration)?
        .clone();
    state.metrics.set_catalog_size(workspace.catalog.len());
    Ok((StatusCode::CREATED, Json(service)))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BulkLoadResponse {
    pub loaded: usize,
}

/// PUT /v1/services
pub async fn bulk_load_services(
    State(state): State<AppState>,
    Json(rows): Json<Vec<ServiceRow>>,
) -> Result<Json<BulkLoadResponse>, SimulationError> {
    let mut workspace = state.workspace.write();
    let loaded = workspace.catalog.bulk_load(&rows)?;
    state.metrics.set_catalog_size(loaded);
    Ok(Json(BulkLoadResponse { loaded }))
}

/// DELETE /v1/services
pub async fn clear_services(State(state): State<AppState>) -> StatusCode {
    let mut workspace = state.workspace.write();
    workspace.catalog.clear();
    workspace.last_run = None;
    state.metrics.set_catalog_size(0);
    StatusCode::NO_CONTENT
}

// ============== Table Handlers ==============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TablesResponse {
    pub arrival: ProbabilityTable,
    pub service: ProbabilityTable,
}

/// Replacement tables; an omitted table is left as it is
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TablesRequest {
    pub arrival: Option<TableInput>,
    pub service: Option<TableInput>,
}

/// GET /v1/tables
pub async fn get_tables(State(state): State<AppState>) -> Json<TablesResponse> {
    let workspace = state.workspace.read();
    Json(TablesResponse {
        arrival: workspace.arrivals.clone(),
        service: workspace.service_times.clone(),
    })
}

/// PUT /v1/tables
pub async fn put_tables(
    State(state): State<AppState>,
    Json(request): Json<TablesRequest>,
) -> Result<Json<TablesResponse>, SimulationError> {
    // Build both before touching the workspace so a bad table changes nothing
    let arrival = request
        .arrival
        .as_ref()
        .map(|input| ProbabilityTable::from_input(ARRIVAL_TABLE, input))
        .transpose()?;
    let service = request
        .service
        .as_ref()
        .map(|input| ProbabilityTable::from_input(SERVICE_TABLE, input))
        .transpose()?;

    let mut workspace = state.workspace.write();
    if let Some(table) = arrival {
        workspace.arrivals = table;
    }
    if let Some(table) = service {
        workspace.service_times = table;
    }

    Ok(Json(TablesResponse {
        arrival: workspace.arrivals.clone(),
        service: workspace.service_times.clone(),
    }))
}

/// DELETE /v1/tables
pub async fn clear_tables(State(state): State<AppState>) -> StatusCode {
    let mut workspace = state.workspace.write();
    workspace.arrivals = ProbabilityTable::empty(ARRIVAL_TABLE);
    workspace.service_times = ProbabilityTable::empty(SERVICE_TABLE);
    StatusCode::NO_CONTENT
}

// ============== Simulation Handlers ==============

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleSimulationRequest {
    #[serde(default)]
    pub mode: Option<SingleServerMode>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub simultaneous_arrivals: Option<bool>,
    /// Return events ordered by clock time instead of generation order
    #[serde(default)]
    pub sorted: bool,
    /// Inline catalog used instead of the workspace catalog
    #[serde(default)]
    pub services: Option<Vec<ServiceRow>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParallelSimulationRequest {
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub period_minutes: Option<f64>,
    #[serde(default, alias = "arrivalTable")]
    pub arrival: Option<TableInput>,
    #[serde(default, alias = "serviceTable")]
    pub service: Option<TableInput>,
}

/// POST /v1/simulations/single
pub async fn run_single(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<SingleSimulationRequest>,
) -> Result<Json<SingleServerRun>, SimulationError> {
    let start = Instant::now();
    let result = single_run(&state, &request);
    let mut run = finish(&state, &request_id, "single", start, result)?;

    state.workspace.write().last_run = Some(SimulationRun::Single(run.clone()));

    if request.sorted {
        run.events = chronological(&run.events);
    }
    Ok(Json(run))
}

fn single_run(state: &AppState, request: &SingleSimulationRequest) -> SimulatorResult<SingleServerRun> {
    let catalog = match &request.services {
        Some(rows) if rows.is_empty() => ServiceCatalog::new(),
        Some(rows) => ServiceCatalog::from_rows(rows)?,
        None => state.workspace.read().catalog.clone(),
    };
    let options = SingleRunOptions {
        mode: request.mode,
        seed: request.seed,
        simultaneous_arrivals: request.simultaneous_arrivals,
    };
    state.engine.run_single(&catalog, &options)
}

/// POST /v1/simulations/parallel
pub async fn run_parallel(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<ParallelSimulationRequest>,
) -> Result<Json<ParallelRun>, SimulationError> {
    let start = Instant::now();
    let result = parallel_run(&state, &request);
    let run = finish(&state, &request_id, "parallel", start, result)?;

    state.workspace.write().last_run = Some(SimulationRun::Parallel(run.clone()));
    Ok(Json(run))
}

fn parallel_run(state: &AppState, request: &ParallelSimulationRequest) -> SimulatorResult<ParallelRun> {
    let (workspace_arrivals, workspace_service) = {
        let workspace = state.workspace.read();
        (workspace.arrivals.clone(), workspace.service_times.clone())
    };
    let arrivals = match &request.arrival {
        Some(input) => ProbabilityTable::from_input(ARRIVAL_TABLE, input)?,
        None => workspace_arrivals,
    };
    let service = match &request.service {
        Some(input) => ProbabilityTable::from_input(SERVICE_TABLE, input)?,
        None => workspace_service,
    };
    let options = ParallelRunOptions {
        seed: request.seed,
        period_minutes: request.period_minutes,
    };
    state.engine.run_parallel(&arrivals, &service, &options)
}

/// Record metrics and logs for a finished run
fn finish<T: CustomerCount>(
    state: &AppState,
    request_id: &RequestId,
    kind: &str,
    start: Instant,
    result: SimulatorResult<T>,
) -> SimulatorResult<T> {
    match result {
        Ok(run) => {
            let elapsed = start.elapsed();
            state.metrics.record_run(kind, run.customers(), elapsed);
            log_run_served(&request_id.0, kind, run.customers(), elapsed);
            Ok(run)
        }
        Err(e) => {
            state.metrics.record_error(kind, e.code());
            log_run_error(&request_id.0, kind, &e);
            Err(e)
        }
    }
}

trait CustomerCount {
    fn customers(&self) -> usize;
}

impl CustomerCount for SingleServerRun {
    fn customers(&self) -> usize {
        self.customer_count()
    }
}

impl CustomerCount for ParallelRun {
    fn customers(&self) -> usize {
        self.customer_count()
    }
}

/// GET /v1/simulations/last
pub async fn last_run(State(state): State<AppState>) -> Json<Option<SimulationRun>> {
    Json(state.workspace.read().last_run.clone())
}

// ============== Admin Handlers ==============

/// GET /admin/stats
pub async fn get_stats(State(state): State<AppState>) -> Json<EngineStats> {
    Json(state.engine.stats())
}

/// POST /admin/stats/reset
pub async fn reset_stats(State(state): State<AppState>) -> StatusCode {
    state.engine.reset_stats();
    StatusCode::NO_CONTENT
}

// ============== Health Handlers ==============

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<DetailedHealthResponse> {
    let mut checks = HashMap::new();
    let mut overall_status = HealthStatus::Healthy;

    let stats = state.engine.stats();
    checks.insert(
        "engine".to_string(),
        ComponentHealth {
            status: ComponentStatus::Pass,
            message: Some(format!("Completed {} runs", stats.total_runs)),
            value: Some(stats.total_runs as f64),
        },
    );

    let workspace_check = check_workspace(&state);
    if workspace_check.status == ComponentStatus::Warn {
        overall_status = HealthStatus::Degraded;
    }
    checks.insert("workspace".to_string(), workspace_check);

    if state.shutdown.is_draining() {
        overall_status = HealthStatus::Unhealthy;
        checks.insert(
            "shutdown".to_string(),
            ComponentHealth {
                status: ComponentStatus::Fail,
                message: Some("Server is draining".to_string()),
                value: None,
            },
        );
    }

    Json(DetailedHealthResponse {
        status: overall_status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.engine.uptime().as_secs(),
        timestamp: chrono::Utc::now(),
        checks,
    })
}

fn check_workspace(state: &AppState) -> ComponentHealth {
    let workspace = state.workspace.read();
    let services = workspace.catalog.len();
    let tables_ready = !workspace.arrivals.is_empty() && !workspace.service_times.is_empty();

    match (services, tables_ready) {
        (0, false) => ComponentHealth {
            status: ComponentStatus::Warn,
            message: Some("No services and no probability tables loaded".to_string()),
            value: Some(0.0),
        },
        (0, true) => ComponentHealth {
            status: ComponentStatus::Warn,
            message: Some("No services loaded".to_string()),
            value: Some(0.0),
        },
        (n, false) => ComponentHealth {
            status: ComponentStatus::Warn,
            message: Some(format!("{} services loaded, probability tables missing", n)),
            value: Some(n as f64),
        },
        (n, true) => ComponentHealth {
            status: ComponentStatus::Pass,
            message: Some(format!("{} services loaded", n)),
            value: Some(n as f64),
        },
    }
}

/// GET /ready
pub async fn ready_check(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    if state.shutdown.is_draining() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyResponse {
                ready: false,
                reason: Some("Server is draining".to_string()),
            }),
        );
    }

    (
        StatusCode::OK,
        Json(ReadyResponse {
            ready: true,
            reason: None,
        }),
    )
}

/// GET /metrics
pub async fn metrics(State(state): State<AppState>) -> String {
    state.metrics.export()
}

/// Detailed health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub checks: HashMap<String, ComponentHealth>,
}

/// Overall health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Individual component health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

/// Component status (pass/warn/fail)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Pass,
    Warn,
    Fail,
}

/// Readiness response
#[derive(Debug, Clone, Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// GET /version
pub async fn version() -> Json<VersionResponse> {
    Json(VersionResponse {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        rust_version: env!("CARGO_PKG_RUST_VERSION").to_string(),
    })
}

#[derive(Serialize)]
pub struct VersionResponse {
    pub name: String,
    pub version: String,
    pub rust_version: String,
}

/// GET /
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        name: "Queue Simulator".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        description: env!("CARGO_PKG_DESCRIPTION").to_string(),
        endpoints: [
            "/v1/services",
            "/v1/tables",
            "/v1/simulations/single",
            "/v1/simulations/parallel",
            "/v1/simulations/last",
            "/admin/stats",
            "/health",
            "/metrics",
        ]
        .into_iter()
        .map(String::from)
        .collect(),
    })
}

#[derive(Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<String>,
}
