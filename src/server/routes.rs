//! Route definitions

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;
use super::state::AppState;

/// Catalog and probability table routes
pub fn workspace_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/services",
            get(handlers::list_services)
                .post(handlers::add_service)
                .put(handlers::bulk_load_services)
                .delete(handlers::clear_services),
        )
        .route(
            "/v1/tables",
            get(handlers::get_tables)
                .put(handlers::put_tables)
                .delete(handlers::clear_tables),
        )
}

/// Simulation run routes
pub fn simulation_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/simulations/single", post(handlers::run_single))
        .route("/v1/simulations/parallel", post(handlers::run_parallel))
        .route("/v1/simulations/last", get(handlers::last_run))
}

/// Admin routes
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/stats", get(handlers::get_stats))
        .route("/admin/stats/reset", post(handlers::reset_stats))
}

/// Health and metrics routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/healthz", get(handlers::health_check))
        .route("/ready", get(handlers::ready_check))
        .route("/readyz", get(handlers::ready_check))
        .route("/metrics", get(handlers::metrics))
        .route("/version", get(handlers::version))
        .route("/", get(handlers::root))
}
