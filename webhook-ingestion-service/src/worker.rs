//! Polls the ledger for due events and drives them through [`dispatch::process_once`].

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::dispatch::{self, Deps, ProcessOnceError};

#[derive(Debug, Clone, Copy)]
pub struct WorkerConfig {
    pub interval: Duration,
    pub burst: usize,
    pub idle_delay: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            burst: 5,
            idle_delay: Duration::from_millis(800),
        }
    }
}

/// Runs the worker loop until `cancel` is triggered.
///
/// Each tick attempts up to `cfg.burst` deliveries. A `NoWork` result ends
/// the burst early; a delivery error is logged (the event itself was
/// already marked `failed` with a scheduled retry inside `process_once`)
/// and the burst continues. When a whole tick processes nothing, the loop
/// sleeps for `cfg.idle_delay` before the next tick to avoid busy-polling.
pub async fn run(deps: Deps, cfg: WorkerConfig, cancel: CancellationToken) {
    let cfg = WorkerConfig {
        interval: if cfg.interval.is_zero() {
            WorkerConfig::default().interval
        } else {
            cfg.interval
        },
        burst: cfg.burst.max(1),
        idle_delay: if cfg.idle_delay.is_zero() {
            WorkerConfig::default().idle_delay
        } else {
            cfg.idle_delay
        },
    };

    let mut ticker = tokio::time::interval(cfg.interval);
    info!(interval_ms = cfg.interval.as_millis() as u64, burst = cfg.burst, "worker started");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("worker stopping");
                return;
            }
            _ = ticker.tick() => {
                let processed_any = run_burst(&deps, cfg.burst).await;

                if !processed_any {
                    tokio::select! {
                        _ = cancel.cancelled() => return,
                        _ = tokio::time::sleep(cfg.idle_delay) => {}
                    }
                }
            }
        }
    }
}

async fn run_burst(deps: &Deps, burst: usize) -> bool {
    let mut processed_any = false;

    for _ in 0..burst {
        match dispatch::process_once(deps).await {
            Ok(_) => processed_any = true,
            Err(ProcessOnceError::NoWork) => break,
            Err(ProcessOnceError::Processor(e)) => {
                // Already marked `failed` with a scheduled retry inside
                // process_once; the event was still claimed, so the burst
                // made progress even though this delivery didn't succeed.
                warn!(err = %e, "dispatch cycle: processor error");
                processed_any = true;
            }
            Err(e) => {
                warn!(err = %e, "dispatch cycle: ledger error");
            }
        }
    }

    processed_any
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{EventLedger, InMemoryLedger};
    use crate::processor::NoopProcessor;
    use std::sync::Arc;
    use std::time::Duration as StdDuration;

    #[tokio::test]
    async fn stops_promptly_when_cancelled() {
        let ledger: Arc<dyn EventLedger> = Arc::new(InMemoryLedger::new());
        let deps = Deps::new(ledger, Arc::new(NoopProcessor));
        let cancel = CancellationToken::new();

        let cfg = WorkerConfig {
            interval: StdDuration::from_millis(10),
            burst: 1,
            idle_delay: StdDuration::from_millis(10),
        };

        let token = cancel.clone();
        let handle = tokio::spawn(run(deps, cfg, token));

        cancel.cancel();
        tokio::time::timeout(StdDuration::from_secs(1), handle)
            .await
            .expect("worker should stop promptly")
            .unwrap();
    }

    #[tokio::test]
    async fn drains_a_burst_of_due_events() {
        let ledger: Arc<dyn EventLedger> = Arc::new(InMemoryLedger::new());
        for i in 0..3 {
            ledger
                .insert_received(&format!("evt_{i}"), "t", b"{}")
                .await
                .unwrap();
        }

        let deps = Deps::new(ledger.clone(), Arc::new(NoopProcessor));
        let processed_any = run_burst(&deps, 10).await;

        assert!(processed_any);
        for i in 0..3 {
            let ev = ledger.get(&format!("evt_{i}")).await.unwrap();
            assert_eq!(ev.status, crate::model::EventStatus::Processed);
        }
    }
}
