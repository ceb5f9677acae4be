//! Accepts a verified webhook body and records it in the ledger.

use std::sync::Arc;

use crate::error::IngestError;
use crate::ledger::EventLedger;
use crate::model::Event;

pub struct Ingestion {
    ledger: Arc<dyn EventLedger>,
}

impl Ingestion {
    pub fn new(ledger: Arc<dyn EventLedger>) -> Self {
        Self { ledger }
    }

    /// Returns `true` if this request created a new event, `false` if
    /// `id` had already been ingested. The full body is stored as the
    /// event payload verbatim — it's what the signature was verified
    /// against.
    pub async fn ingest(&self, id: &str, raw_body: &[u8]) -> Result<bool, IngestError> {
        let parsed: serde_json::Value =
            serde_json::from_slice(raw_body).map_err(|_| IngestError::MalformedBody)?;

        let event_type = parsed
            .get("type")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .unwrap_or("");
        if event_type.is_empty() {
            return Err(IngestError::MissingType);
        }

        // The raw bytes are stored, not `parsed` re-serialized — they're
        // what the signature was verified against.
        Ok(self.ledger.insert_received(id, event_type, raw_body).await?)
    }

    pub async fn get(&self, id: &str) -> Result<Event, IngestError> {
        Ok(self.ledger.get(id).await?)
    }
}
