//! HTTP server implementation
//!
//! Exposes the catalog, the probability tables and both generators as JSON
//! endpoints over a per-process workspace.

mod handlers;
mod middleware;
mod routes;
mod shutdown;
mod state;

pub use handlers::*;
pub use middleware::*;
pub use routes::*;
pub use shutdown::*;
pub use state::*;

use axum::{extract::DefaultBodyLimit, middleware as axum_middleware, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::config::{ServerConfig, SimulatorConfig};
use crate::telemetry::init_telemetry;

/// Request bodies larger than this are rejected
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Run the simulator server
pub async fn run_server(config: SimulatorConfig) -> anyhow::Result<()> {
    init_telemetry(&config.telemetry)?;

    let state = AppState::new(config.clone())?;
    let shutdown_state = state.shutdown.clone();
    let app = create_router(state.clone());

    let addr = config.server.socket_addr()?;

    info!(
        "Starting Queue Simulator v{} on {}",
        env!("CARGO_PKG_VERSION"),
        addr
    );
    {
        let workspace = state.workspace.read();
        info!(
            services = workspace.catalog.len(),
            arrival_rows = workspace.arrivals.len(),
            service_rows = workspace.service_times.len(),
            "Workspace loaded"
        );
    }
    info!(
        period_minutes = config.parallel.simulation_period_minutes,
        seeded = config.seed.is_some(),
        "Simulation defaults"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(graceful_shutdown(shutdown_state))
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    let server = &state.config.server;

    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(server.request_timeout))
        .layer(tower::limit::ConcurrencyLimitLayer::new(server.max_concurrent_requests));

    let cors = build_cors_layer(server);
    let shutdown = state.shutdown.clone();

    Router::new()
        .merge(routes::workspace_routes())
        .merge(routes::simulation_routes())
        .merge(routes::admin_routes())
        .merge(routes::health_routes())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            http_metrics_middleware,
        ))
        .layer(axum_middleware::from_fn_with_state(
            shutdown,
            request_tracking_middleware,
        ))
        .layer(cors)
        .layer(middleware)
        // outermost, so drain and timeout responses are tagged too
        .layer(axum_middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// CORS layer from the server settings
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    if !config.cors_enabled {
        return CorsLayer::new();
    }

    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if config.cors_origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(AllowOrigin::list(origins))
    }
}
