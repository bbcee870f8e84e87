//! Request draining on shutdown
//!
//! Once a signal arrives the server answers new requests with 503 and gives
//! the ones already running up to `drain_timeout` to finish.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, info, warn};

use crate::error::ErrorResponse;

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// In-flight counter plus the draining flag, shared by every connection
#[derive(Debug)]
pub struct ShutdownState {
    in_flight: AtomicU64,
    draining: AtomicBool,
    drain_timeout: Duration,
}

impl ShutdownState {
    pub fn new(drain_timeout: Duration) -> Self {
        Self {
            in_flight: AtomicU64::new(0),
            draining: AtomicBool::new(false),
            drain_timeout,
        }
    }

    /// Count a request as running until the returned guard is dropped
    pub fn track(&self) -> InFlightGuard<'_> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        InFlightGuard { state: self }
    }

    pub fn in_flight_count(&self) -> u64 {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::SeqCst)
    }

    pub fn start_drain(&self) {
        info!(in_flight = self.in_flight_count(), "Draining simulator server");
        self.draining.store(true, Ordering::SeqCst);
    }

    /// Poll until nothing is in flight or `drain_timeout` has passed
    pub async fn wait_for_drain(&self) {
        let deadline = Instant::now() + self.drain_timeout;

        loop {
            let remaining = self.in_flight_count();
            if remaining == 0 {
                info!("Drain complete");
                return;
            }
            if Instant::now() >= deadline {
                warn!(remaining, "Drain deadline reached, abandoning open requests");
                return;
            }
            tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
        }
    }
}

impl Default for ShutdownState {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

/// Decrements the in-flight counter on drop, including when an outer
/// timeout cancels the request future
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    state: &'a ShutdownState,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.state.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Rejects requests while draining and counts the rest
pub async fn request_tracking_middleware(
    State(shutdown): State<Arc<ShutdownState>>,
    request: Request,
    next: Next,
) -> Result<Response, DrainError> {
    if shutdown.is_draining() {
        return Err(DrainError);
    }

    let _guard = shutdown.track();
    Ok(next.run(request).await)
}

/// 503 sent to requests that arrive after draining began
#[derive(Debug)]
pub struct DrainError;

impl IntoResponse for DrainError {
    fn into_response(self) -> Response {
        let body = ErrorResponse::new(
            "service_unavailable",
            "Simulator is shutting down; retry against another instance.",
        );
        (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
    }
}

/// Resolves on Ctrl+C or SIGTERM, after in-flight requests have drained
pub async fn graceful_shutdown(shutdown_state: Arc<ShutdownState>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal = tokio::select! {
        _ = ctrl_c => "ctrl_c",
        _ = terminate => "sigterm",
    };
    info!(signal, "Shutdown signal received");

    shutdown_state.start_drain();
    shutdown_state.wait_for_drain().await;
}
