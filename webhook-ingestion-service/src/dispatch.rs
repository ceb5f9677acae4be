//! Claims and delivers a single due event. This is the unit the worker
//! loop calls on every burst iteration.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use thiserror::Error;

use crate::backoff::{self, BackoffConfig};
use crate::error::LedgerError;
use crate::ledger::EventLedger;
use crate::processor::Processor;

#[derive(Debug, Error)]
pub enum ProcessOnceError {
    #[error("no due events")]
    NoWork,
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    /// An event was claimed and the processor returned an error. The
    /// ledger has already recorded `failed` with a backoff-scheduled
    /// retry — this variant exists purely so callers (the debug HTTP
    /// endpoint, the worker's burst loop) can tell claimed-but-failed
    /// apart from claimed-and-succeeded.
    #[error("processor failed: {0}")]
    Processor(anyhow::Error),
}

/// Dependencies for a dispatch cycle, bundled the way the worker loop
/// threads them through every tick. `now` and `rng` are injected rather
/// than read ambiently so tests can fix both.
pub struct Deps {
    pub ledger: Arc<dyn EventLedger>,
    pub processor: Arc<dyn Processor>,
    pub backoff: BackoffConfig,
    pub rng: Mutex<StdRng>,
    pub now: Box<dyn Fn() -> DateTime<Utc> + Send + Sync>,
}

impl Deps {
    pub fn new(ledger: Arc<dyn EventLedger>, processor: Arc<dyn Processor>) -> Self {
        Self {
            ledger,
            processor,
            backoff: BackoffConfig::default(),
            rng: Mutex::new(rand_from_entropy()),
            now: Box::new(Utc::now),
        }
    }
}

fn rand_from_entropy() -> StdRng {
    use rand::SeedableRng;
    StdRng::from_entropy()
}

/// Claims one due event and attempts delivery.
///
/// Returns `Ok(true)` when an event was claimed and delivered
/// successfully; `Err(ProcessOnceError::NoWork)` when nothing was due;
/// `Err(ProcessOnceError::Processor(_))` when an event was claimed but
/// delivery failed (it has already been marked `failed` with a
/// backoff-scheduled retry — the error is surfaced, not swallowed, the
/// way the debug `/process/once` endpoint and the worker's burst loop
/// both need to distinguish it from a clean claim); and
/// `Err(ProcessOnceError::Ledger(_))` when a ledger operation itself
/// failed, whether that prevented the claim or happened after a
/// successful delivery while recording the outcome.
pub async fn process_once(deps: &Deps) -> Result<bool, ProcessOnceError> {
    let claimed = deps
        .ledger
        .claim_next_due()
        .await?
        .ok_or(ProcessOnceError::NoWork)?;

    let outcome = deps
        .processor
        .process(&claimed.id, &claimed.event_type, &claimed.payload)
        .await;

    match outcome {
        Ok(()) => {
            deps.ledger.mark_processed(&claimed.id).await?;
            Ok(true)
        }
        Err(e) => {
            let now = (deps.now)();
            let next = {
                let mut rng = deps.rng.lock().unwrap();
                backoff::next_retry_at(now, claimed.attempts, deps.backoff, &mut *rng)
            };
            deps.ledger
                .mark_failed(&claimed.id, &e.to_string(), next)
                .await?;
            Err(ProcessOnceError::Processor(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::InMemoryLedger;
    use async_trait::async_trait;
    use rand::SeedableRng;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FlakyProcessor {
        fail_for: usize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Processor for FlakyProcessor {
        async fn process(
            &self,
            _id: &str,
            _event_type: &str,
            _payload: &[u8],
        ) -> anyhow::Result<()> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.fail_for {
                anyhow::bail!("transient error");
            }
            Ok(())
        }
    }

    fn deps_with(processor: Arc<dyn Processor>, ledger: Arc<dyn EventLedger>) -> Deps {
        Deps {
            ledger,
            processor,
            backoff: BackoffConfig {
                base_delay: std::time::Duration::from_millis(1),
                max_delay: std::time::Duration::from_millis(1),
            },
            rng: Mutex::new(StdRng::seed_from_u64(1)),
            now: Box::new(Utc::now),
        }
    }

    #[tokio::test]
    async fn returns_no_work_when_ledger_is_empty() {
        let deps = deps_with(Arc::new(crate::processor::NoopProcessor), Arc::new(InMemoryLedger::new()));
        let err = process_once(&deps).await.unwrap_err();
        assert!(matches!(err, ProcessOnceError::NoWork));
    }

    #[tokio::test]
    async fn fails_twice_then_processes() {
        let ledger: Arc<dyn EventLedger> = Arc::new(InMemoryLedger::new());
        ledger
            .insert_received("evt_1", "payment_succeeded", br#"{"x": 1}"#)
            .await
            .unwrap();

        let processor: Arc<dyn Processor> = Arc::new(FlakyProcessor {
            fail_for: 2,
            calls: AtomicUsize::new(0),
        });
        let deps = deps_with(processor, ledger.clone());

        let first = process_once(&deps).await.unwrap_err();
        assert!(matches!(first, ProcessOnceError::Processor(_)));
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let second = process_once(&deps).await.unwrap_err();
        assert!(matches!(second, ProcessOnceError::Processor(_)));
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let third = process_once(&deps).await.unwrap();
        assert!(third);

        let event = ledger.get("evt_1").await.unwrap();
        assert_eq!(event.status, crate::model::EventStatus::Processed);
        assert_eq!(event.attempts, 3);
    }
}
