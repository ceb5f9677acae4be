//! The durable event ledger: the capability contract the ingestion layer
//! writes through and the dispatch unit claims work from.

mod mock;
mod postgres;

pub use mock::InMemoryLedger;
pub use postgres::PostgresLedger;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::LedgerError;
use crate::model::{ClaimedEvent, Event};

#[async_trait]
pub trait EventLedger: Send + Sync {
    /// Inserts a newly received event. Returns `true` if a new row was
    /// created, `false` if `id` already existed (idempotent ingestion).
    async fn insert_received(
        &self,
        id: &str,
        event_type: &str,
        payload: &[u8],
    ) -> Result<bool, LedgerError>;

    async fn get(&self, id: &str) -> Result<Event, LedgerError>;

    /// Atomically claims one due event (status `received` or `failed`,
    /// `next_retry_at <= now`) and marks it `processing`, incrementing
    /// `attempts`. Returns `None` if nothing is due.
    async fn claim_next_due(&self) -> Result<Option<ClaimedEvent>, LedgerError>;

    async fn mark_processed(&self, id: &str) -> Result<(), LedgerError>;

    async fn mark_failed(
        &self,
        id: &str,
        last_error: &str,
        next_retry_at: DateTime<Utc>,
    ) -> Result<(), LedgerError>;

    /// Bounded-time liveness check for `/readyz`. Must resolve to
    /// `Err(LedgerError::Timeout)` rather than hang when the ledger is
    /// unreachable.
    async fn ping(&self, timeout: Duration) -> Result<(), LedgerError>;
}
