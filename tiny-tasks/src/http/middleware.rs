//! Request-id tagging and structured access logging.
//!
//! Mirrors `internal/httpapi/middleware.go`'s `requestID`/`requestLogging`
//! pair, ported to axum's `from_fn` layering and `tracing` instead of
//! `log.Printf`.

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use std::time::Instant;
use tracing::info;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub async fn request_id(mut req: Request, next: Next) -> Response {
    let rid = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(crate::ids::new_id);

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

#[derive(Clone)]
pub struct RequestId(pub String);
