use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde_json::json;

use crate::dispatch::{self, Deps, ProcessOnceError};
use crate::error::{IngestError, LedgerError, VerifyError};
use crate::ingestion::Ingestion;
use crate::verifier::{self, Input as VerifyInput};
use crate::AppState;

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

fn header(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}

pub async fn webhook_provider(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Body,
) -> Response {
    let event_id = header(&headers, "x-event-id").trim().to_string();
    if event_id.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "missing X-Event-Id");
    }

    let body = match axum::body::to_bytes(body, crate::http::MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(_) => return error_response(StatusCode::BAD_REQUEST, "payload too large"),
    };

    let ts_header = header(&headers, "x-event-timestamp");
    let sig_header = header(&headers, "x-signature");

    let verify_result = verifier::verify(VerifyInput {
        secret: state.config.webhook_secret.as_bytes(),
        timestamp_header: &ts_header,
        signature_header: &sig_header,
        body: &body,
        now: Utc::now(),
    });

    if let Err(e) = verify_result {
        return match e {
            VerifyError::MissingTimestamp | VerifyError::MalformedTimestamp | VerifyError::StaleTimestamp => {
                error_response(StatusCode::BAD_REQUEST, e.to_string())
            }
            VerifyError::MissingSignature | VerifyError::MalformedSignature | VerifyError::SignatureMismatch => {
                error_response(StatusCode::UNAUTHORIZED, e.to_string())
            }
        };
    }

    let ingestion = Ingestion::new(state.ledger.clone());
    match ingestion.ingest(&event_id, &body).await {
        // Webhook-friendly: always 202 once accepted, whether new or a
        // replay of a duplicate id.
        Ok(_created) => StatusCode::ACCEPTED.into_response(),
        Err(IngestError::MissingType) | Err(IngestError::MalformedBody) => {
            error_response(StatusCode::BAD_REQUEST, "invalid event payload")
        }
        Err(IngestError::Ledger(_)) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}

pub async fn get_event(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let id = id.trim();
    if id.is_empty() {
        return error_response(StatusCode::NOT_FOUND, "not found");
    }

    match state.ledger.get(id).await {
        Ok(event) => Json(event).into_response(),
        Err(LedgerError::NotFound) => error_response(StatusCode::NOT_FOUND, "event not found"),
        Err(LedgerError::Database(_)) | Err(LedgerError::Timeout) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}

/// Debug/ops endpoint: synchronously runs one dispatch cycle instead of
/// waiting for the background worker's next tick.
pub async fn process_once(State(state): State<AppState>) -> Response {
    let deps = Deps::new(state.ledger.clone(), state.processor.clone());

    match dispatch::process_once(&deps).await {
        Ok(_) => (StatusCode::NO_CONTENT, [("x-processed", "1")]).into_response(),
        Err(ProcessOnceError::NoWork) => {
            (StatusCode::NO_CONTENT, [("x-processed", "0")]).into_response()
        }
        // The event was claimed, but this is a debug/ops endpoint: a
        // failed delivery is still surfaced as a 500, even though the
        // retry has already been scheduled in the ledger.
        Err(ProcessOnceError::Processor(e)) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
        Err(ProcessOnceError::Ledger(e)) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

pub async fn readyz(State(state): State<AppState>) -> Response {
    match state.ledger.ping(crate::http::READYZ_TIMEOUT).await {
        Ok(()) => (StatusCode::OK, "ready").into_response(),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "not ready").into_response(),
    }
}

pub async fn healthz() -> &'static str {
    "ok"
}
