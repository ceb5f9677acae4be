//! In-memory [`EventLedger`] used by unit tests that exercise dispatch and
//! HTTP handler logic without a database.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::EventLedger;
use crate::error::LedgerError;
use crate::model::{ClaimedEvent, Event, EventStatus};

struct Row {
    event_type: String,
    payload: Vec<u8>,
    status: EventStatus,
    attempts: i32,
    next_retry_at: DateTime<Utc>,
    last_error: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    processed_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
pub struct InMemoryLedger {
    rows: Mutex<HashMap<String, Row>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventLedger for InMemoryLedger {
    async fn insert_received(
        &self,
        id: &str,
        event_type: &str,
        payload: &[u8],
    ) -> Result<bool, LedgerError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(id) {
            return Ok(false);
        }
        let now = Utc::now();
        rows.insert(
            id.to_string(),
            Row {
                event_type: event_type.to_string(),
                payload: payload.to_vec(),
                status: EventStatus::Received,
                attempts: 0,
                next_retry_at: now,
                last_error: None,
                created_at: now,
                updated_at: now,
                processed_at: None,
            },
        );
        Ok(true)
    }

    async fn get(&self, id: &str) -> Result<Event, LedgerError> {
        let rows = self.rows.lock().unwrap();
        let row = rows.get(id).ok_or(LedgerError::NotFound)?;
        Ok(Event {
            id: id.to_string(),
            event_type: row.event_type.clone(),
            payload: row.payload.clone(),
            status: row.status,
            attempts: row.attempts,
            next_retry_at: row.next_retry_at,
            last_error: row.last_error.clone(),
            created_at: row.created_at,
            updated_at: row.updated_at,
            processed_at: row.processed_at,
        })
    }

    async fn claim_next_due(&self) -> Result<Option<ClaimedEvent>, LedgerError> {
        let mut rows = self.rows.lock().unwrap();
        let now = Utc::now();

        let due_id = rows
            .iter()
            .filter(|(_, r)| {
                matches!(r.status, EventStatus::Received | EventStatus::Failed) && r.next_retry_at <= now
            })
            .min_by_key(|(_, r)| r.created_at)
            .map(|(id, _)| id.clone());

        let Some(id) = due_id else {
            return Ok(None);
        };

        let row = rows.get_mut(&id).unwrap();
        let claimed = ClaimedEvent {
            id: id.clone(),
            event_type: row.event_type.clone(),
            payload: row.payload.clone(),
            attempts: row.attempts,
        };
        row.status = EventStatus::Processing;
        row.attempts += 1;
        row.updated_at = now;

        Ok(Some(claimed))
    }

    async fn mark_processed(&self, id: &str) -> Result<(), LedgerError> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows.get_mut(id).ok_or(LedgerError::NotFound)?;
        row.status = EventStatus::Processed;
        row.processed_at = Some(Utc::now());
        row.last_error = None;
        row.updated_at = Utc::now();
        Ok(())
    }

    async fn mark_failed(
        &self,
        id: &str,
        last_error: &str,
        next_retry_at: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows.get_mut(id).ok_or(LedgerError::NotFound)?;
        row.status = EventStatus::Failed;
        row.last_error = Some(last_error.to_string());
        row.next_retry_at = next_retry_at;
        row.updated_at = Utc::now();
        Ok(())
    }

    async fn ping(&self, _timeout: Duration) -> Result<(), LedgerError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_is_idempotent_on_duplicate_id() {
        let ledger = InMemoryLedger::new();
        let payload = br#"{"a": 1}"#;

        let first = ledger.insert_received("evt_1", "order.created", payload).await.unwrap();
        let second = ledger.insert_received("evt_1", "order.created", payload).await.unwrap();

        assert!(first);
        assert!(!second);
    }

    #[tokio::test]
    async fn claim_next_due_skips_future_retries() {
        let ledger = InMemoryLedger::new();
        ledger.insert_received("evt_1", "t", b"{}").await.unwrap();

        let future = Utc::now() + chrono::Duration::hours(1);
        ledger.mark_failed("evt_1", "boom", future).await.unwrap();

        let claimed = ledger.claim_next_due().await.unwrap();
        assert!(claimed.is_none());
    }

    #[tokio::test]
    async fn claim_next_due_returns_none_when_empty() {
        let ledger = InMemoryLedger::new();
        assert!(ledger.claim_next_due().await.unwrap().is_none());
    }
}
