//! HTTP surface: webhook ingestion, event lookup, the debug process-once
//! endpoint, and liveness/readiness probes.

mod middleware;
mod routes;

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Request bodies larger than this are rejected with `400` (spec: 1 MiB
/// inbound limit on webhook deliveries). Enforced inside
/// [`routes::webhook_provider`] itself via `axum::body::to_bytes`'s limit
/// argument, rather than axum's own `DefaultBodyLimit` layer, because that
/// layer answers `413` where the spec wants `400 payload too large`.
pub const MAX_BODY_BYTES: usize = 1 << 20;

/// Bound on the `/readyz` ledger ping (spec.md §4.7's "bounded-time ping"),
/// mirroring the original's 1s `context.WithTimeout` around `PingContext`.
pub const READYZ_TIMEOUT: Duration = Duration::from_secs(1);

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/webhooks/provider", post(routes::webhook_provider))
        .route("/events/{id}", get(routes::get_event))
        .route("/process/once", post(routes::process_once))
        .route("/readyz", get(routes::readyz))
        .route("/healthz", get(routes::healthz))
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(middleware::request_id))
        .layer(axum::middleware::from_fn(middleware::log_request))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::enforce_deadline,
        ))
        .with_state(state)
}
