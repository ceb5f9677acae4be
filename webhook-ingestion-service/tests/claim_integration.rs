//! Exercises `claim_next_due`'s mutual-exclusion guarantee against a real
//! PostgreSQL instance. Skipped unless `DB_URL` is set, mirroring
//! `claim_integration_test.go`'s `if dbURL == "" { t.Skip(...) }`.

use std::sync::Arc;

use webhook_ingestion_service::ledger::{EventLedger, PostgresLedger};

async fn connected_ledger() -> Option<PostgresLedger> {
    let db_url = std::env::var("DB_URL").ok()?;
    let ledger = PostgresLedger::connect(&db_url)
        .await
        .expect("connect to DB_URL");
    ledger.migrate().await.expect("run migrations");
    Some(ledger)
}

#[tokio::test]
async fn only_one_worker_claims_a_due_event() {
    let Some(ledger) = connected_ledger().await else {
        eprintln!("DB_URL not set, skipping integration test");
        return;
    };
    let ledger: Arc<dyn EventLedger> = Arc::new(ledger);

    let id = format!("evt_claim_once_{}", uuid::Uuid::new_v4().simple());
    let payload = br#"{"type": "payment_succeeded", "data": {"x": 1}}"#;

    let created = ledger
        .insert_received(&id, "payment_succeeded", payload)
        .await
        .unwrap();
    assert!(created);

    const N: usize = 10;
    let mut handles = Vec::with_capacity(N);
    for _ in 0..N {
        let ledger = ledger.clone();
        handles.push(tokio::spawn(async move { ledger.claim_next_due().await }));
    }

    let mut claimed_ids = Vec::new();
    for handle in handles {
        if let Some(claimed) = handle.await.unwrap().unwrap() {
            claimed_ids.push(claimed.id);
        }
    }

    assert_eq!(claimed_ids.len(), 1, "expected exactly one claim, got {claimed_ids:?}");
    assert_eq!(claimed_ids[0], id);

    let event = ledger.get(&id).await.unwrap();
    assert_eq!(event.status, webhook_ingestion_service::model::EventStatus::Processing);
    assert_eq!(event.attempts, 1);
}

#[tokio::test]
async fn ingestion_idempotence_against_a_real_database() {
    let Some(ledger) = connected_ledger().await else {
        eprintln!("DB_URL not set, skipping integration test");
        return;
    };

    let id = format!("evt_dup_{}", uuid::Uuid::new_v4().simple());
    let payload = br#"{"type": "order.created", "data": {}}"#;

    let first = ledger.insert_received(&id, "order.created", payload).await.unwrap();
    let second = ledger.insert_received(&id, "order.created", payload).await.unwrap();

    assert!(first);
    assert!(!second);

    let event = ledger.get(&id).await.unwrap();
    assert_eq!(event.attempts, 0);
}

#[tokio::test]
async fn ping_resolves_within_the_given_timeout() {
    let Some(ledger) = connected_ledger().await else {
        eprintln!("DB_URL not set, skipping integration test");
        return;
    };

    ledger
        .ping(std::time::Duration::from_secs(1))
        .await
        .expect("a reachable database should ping successfully");
}
