//! Request-id tagging, structured access logging, and the per-request
//! deadline.
//!
//! Mirrors the teacher's `WithRequestID`/`Logging`/`timeout` middleware
//! trio, ported to axum's `from_fn` layering and `tracing` instead of
//! `log.Logger` and `context.WithTimeout`.

use axum::extract::{Request, State};
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::time::Instant;
use tracing::info;

use crate::AppState;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub async fn request_id(mut req: Request, next: Next) -> Response {
    let rid = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(new_request_id);

    req.extensions_mut().insert(RequestId(rid.clone()));

    let mut res = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&rid) {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    res
}

pub async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();

    let res = next.run(req).await;

    let rid = res
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    info!(
        rid = %rid,
        method = %method,
        path = %path,
        status = res.status().as_u16(),
        dur_ms = start.elapsed().as_millis() as u64,
        "http_request"
    );

    res
}

/// Bounds every request to `state.config.request_timeout()`, the axum
/// analogue of the teacher's `context.WithTimeout` wrapper — a handler that
/// runs past the deadline gets a `504` instead of hanging the connection.
pub async fn enforce_deadline(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match tokio::time::timeout(state.config.request_timeout(), next.run(req)).await {
        Ok(res) => res,
        Err(_) => StatusCode::GATEWAY_TIMEOUT.into_response(),
    }
}

#[derive(Clone)]
pub struct RequestId(pub String);

fn new_request_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
