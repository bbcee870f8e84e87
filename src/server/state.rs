//! Server state management

use std::sync::Arc;

use parking_lot::RwLock;

use super::shutdown::ShutdownState;
use crate::catalog::ServiceCatalog;
use crate::config::SimulatorConfig;
use crate::engine::SimulationEngine;
use crate::error::SimulatorResult;
use crate::probability::ProbabilityTable;
use crate::telemetry::SimulatorMetrics;
use crate::types::SimulationRun;

/// Per-process catalog, tables and the most recent run
#[derive(Debug, Clone)]
pub struct Workspace {
    pub catalog: ServiceCatalog,
    pub arrivals: ProbabilityTable,
    pub service_times: ProbabilityTable,
    pub last_run: Option<SimulationRun>,
}

impl Workspace {
    /// Seed the workspace from the configured catalog and tables
    pub fn from_config(config: &SimulatorConfig) -> SimulatorResult<Self> {
        Ok(Self {
            catalog: config.build_catalog()?,
            arrivals: config.build_arrival_table()?,
            service_times: config.build_service_table()?,
            last_run: None,
        })
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SimulationEngine>,
    pub metrics: Arc<SimulatorMetrics>,
    pub config: Arc<SimulatorConfig>,
    pub workspace: Arc<RwLock<Workspace>>,
    pub shutdown: Arc<ShutdownState>,
}

impl AppState {
    pub fn new(config: SimulatorConfig) -> SimulatorResult<Self> {
        let workspace = Workspace::from_config(&config)?;
        let metrics = SimulatorMetrics::new();
        metrics.set_catalog_size(workspace.catalog.len());

        Ok(Self {
            engine: Arc::new(SimulationEngine::new(config.clone())),
            metrics: Arc::new(metrics),
            shutdown: Arc::new(ShutdownState::new(config.server.request_timeout)),
            workspace: Arc::new(RwLock::new(workspace)),
            config: Arc::new(config),
        })
    }
}
