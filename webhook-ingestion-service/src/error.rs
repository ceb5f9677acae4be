//! Typed error enums for the core library.
//!
//! Each module-facing error implements `thiserror::Error` so call sites can
//! match on variants; `anyhow` is reserved for the HTTP and bootstrap
//! boundaries where only a message and a status code matter.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("missing signature header")]
    MissingSignature,
    #[error("missing timestamp header")]
    MissingTimestamp,
    #[error("timestamp header is not a valid unix timestamp")]
    MalformedTimestamp,
    #[error("signature header is not valid hex")]
    MalformedSignature,
    #[error("timestamp outside the allowed window")]
    StaleTimestamp,
    #[error("signature does not match")]
    SignatureMismatch,
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("request body is not valid JSON")]
    MalformedBody,
    #[error("event type is required")]
    MissingType,
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("event not found")]
    NotFound,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("ledger did not respond within the deadline")]
    Timeout,
}
