//! The persistent entity: a single webhook delivery.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Received,
    Processing,
    Processed,
    Failed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Received => "received",
            EventStatus::Processing => "processing",
            EventStatus::Processed => "processed",
            EventStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A durably stored webhook event, tracked through its retry lifecycle.
///
/// `payload` is the raw request body, stored verbatim — the signature was
/// validated over these exact bytes, so re-serializing would break the
/// audit trail even though it would still parse.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Event {
    pub id: String,
    #[sqlx(rename = "type")]
    pub event_type: String,
    #[serde(skip_serializing)]
    pub payload: Vec<u8>,
    pub status: EventStatus,
    pub attempts: i32,
    pub next_retry_at: DateTime<Utc>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

/// The subset of an `Event` a claim hands to the dispatch unit — just
/// enough to invoke the processor, not the full row.
#[derive(Debug, Clone)]
pub struct ClaimedEvent {
    pub id: String,
    pub event_type: String,
    pub payload: Vec<u8>,
    pub attempts: i32,
}
