//! The downstream delivery contract a claimed event is handed to.

use async_trait::async_trait;

#[async_trait]
pub trait Processor: Send + Sync {
    async fn process(
        &self,
        event_id: &str,
        event_type: &str,
        payload_bytes: &[u8],
    ) -> anyhow::Result<()>;
}

/// Reference implementation that accepts every event without doing
/// anything with it. Real deployments swap this for a processor that
/// calls a downstream service, writes to a queue, and so on.
pub struct NoopProcessor;

#[async_trait]
impl Processor for NoopProcessor {
    async fn process(
        &self,
        _event_id: &str,
        _event_type: &str,
        _payload_bytes: &[u8],
    ) -> anyhow::Result<()> {
        Ok(())
    }
}
