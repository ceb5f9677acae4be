//! Process-wide, init-time configuration.
//!
//! `DB_URL` and `WEBHOOK_SECRET` are required — absent or empty values are
//! fatal at startup (spec §6). Everything else has a sensible default and
//! is not part of the original contract; it exists so the service is
//! runnable outside of the original's hardcoded `:8080`.

use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "webhook-ingestion-service", version, about)]
pub struct Config {
    /// PostgreSQL connection string for the event ledger.
    #[arg(long, env = "DB_URL")]
    pub db_url: String,

    /// HMAC-SHA256 key used to verify inbound webhook signatures.
    #[arg(long, env = "WEBHOOK_SECRET")]
    pub webhook_secret: String,

    /// Address the HTTP server binds to.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: String,

    /// Base polling interval for the worker loop, in milliseconds.
    #[arg(long, env = "WORKER_INTERVAL_MS", default_value_t = 500)]
    pub worker_interval_ms: u64,

    /// Maximum number of dispatch attempts per worker tick.
    #[arg(long, env = "WORKER_BURST", default_value_t = 5)]
    pub worker_burst: usize,

    /// Sleep duration after an empty burst, in milliseconds.
    #[arg(long, env = "WORKER_IDLE_DELAY_MS", default_value_t = 800)]
    pub worker_idle_delay_ms: u64,

    /// Per-request deadline enforced at the HTTP boundary, in milliseconds.
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value_t = 5_000)]
    pub request_timeout_ms: u64,
}

impl Config {
    /// Load configuration from CLI flags and environment variables.
    ///
    /// Returns an error (rather than panicking) when a required value is
    /// absent or empty, so `main` can log and exit cleanly.
    pub fn load() -> Result<Self> {
        let cfg = Self::parse();
        if cfg.db_url.trim().is_empty() {
            bail!("DB_URL is required");
        }
        if cfg.webhook_secret.trim().is_empty() {
            bail!("WEBHOOK_SECRET is required");
        }
        Ok(cfg)
    }

    pub fn worker_interval(&self) -> Duration {
        Duration::from_millis(self.worker_interval_ms)
    }

    pub fn worker_idle_delay(&self) -> Duration {
        Duration::from_millis(self.worker_idle_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_interval_converts_millis() {
        let cfg = Config {
            db_url: "postgres://x".into(),
            webhook_secret: "s".into(),
            bind_addr: "0.0.0.0:8080".into(),
            worker_interval_ms: 500,
            worker_burst: 5,
            worker_idle_delay_ms: 800,
            request_timeout_ms: 5_000,
        };
        assert_eq!(cfg.worker_interval(), Duration::from_millis(500));
        assert_eq!(cfg.worker_idle_delay(), Duration::from_millis(800));
        assert_eq!(cfg.request_timeout(), Duration::from_millis(5_000));
    }
}
