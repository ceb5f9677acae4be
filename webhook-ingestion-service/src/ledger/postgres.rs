//! PostgreSQL-backed [`EventLedger`].
//!
//! `claim_next_due` relies on `FOR UPDATE SKIP LOCKED`, which SQLite has no
//! equivalent for — multiple worker processes can run `claim_next_due`
//! concurrently without ever handing the same row to two of them, and
//! without blocking on rows another worker already holds.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use super::EventLedger;
use crate::error::LedgerError;
use crate::model::{ClaimedEvent, Event};

pub struct PostgresLedger {
    pool: PgPool,
}

impl PostgresLedger {
    pub async fn connect(db_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPool::connect(db_url).await?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        let ddl = include_str!("../../migrations/001_events.sql");
        for statement in ddl.split(';') {
            let statement = statement.trim();
            if statement.is_empty() {
                continue;
            }
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl EventLedger for PostgresLedger {
    async fn insert_received(
        &self,
        id: &str,
        event_type: &str,
        payload: &[u8],
    ) -> Result<bool, LedgerError> {
        let result = sqlx::query(
            r#"
            INSERT INTO events (id, type, payload, status, attempts, next_retry_at)
            VALUES ($1, $2, $3, 'received', 0, now())
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(event_type)
        .bind(payload)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn get(&self, id: &str) -> Result<Event, LedgerError> {
        sqlx::query_as::<_, Event>(
            r#"
            SELECT id, type, payload, status, attempts, next_retry_at,
                   last_error, created_at, updated_at, processed_at
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(LedgerError::NotFound)
    }

    async fn claim_next_due(&self) -> Result<Option<ClaimedEvent>, LedgerError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            SELECT id, type, payload, attempts
            FROM events
            WHERE status IN ('received', 'failed')
              AND next_retry_at <= now()
            ORDER BY created_at
            FOR UPDATE SKIP LOCKED
            LIMIT 1
            "#,
        )
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.commit().await?;
            return Ok(None);
        };

        let claimed = ClaimedEvent {
            id: row.get("id"),
            event_type: row.get("type"),
            payload: row.get("payload"),
            attempts: row.get("attempts"),
        };

        sqlx::query(
            r#"
            UPDATE events
            SET status = 'processing', attempts = attempts + 1, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(&claimed.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(claimed))
    }

    async fn mark_processed(&self, id: &str) -> Result<(), LedgerError> {
        sqlx::query(
            r#"
            UPDATE events
            SET status = 'processed', processed_at = now(), last_error = NULL, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn mark_failed(
        &self,
        id: &str,
        last_error: &str,
        next_retry_at: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        sqlx::query(
            r#"
            UPDATE events
            SET status = 'failed', last_error = $2, next_retry_at = $3, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(last_error)
        .bind(next_retry_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn ping(&self, timeout: Duration) -> Result<(), LedgerError> {
        match tokio::time::timeout(timeout, sqlx::query("SELECT 1").execute(&self.pool)).await {
            Ok(result) => {
                result?;
                Ok(())
            }
            Err(_) => Err(LedgerError::Timeout),
        }
    }
}
