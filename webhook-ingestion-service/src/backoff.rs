//! Exponential backoff with full jitter for retrying failed deliveries.

use chrono::{DateTime, Utc};
use rand::Rng;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct BackoffConfig {
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }
}

/// Computes the next retry timestamp: `now + uniform(0, min(base * 2^(attempt-1), max))`.
///
/// `attempt` is 1-based; values below 1 are clamped to 1. A non-positive
/// `base_delay` or `max_delay` in `cfg` falls back to [`BackoffConfig::default`]'s
/// values for that field.
pub fn next_retry_at<R: Rng + ?Sized>(
    now: DateTime<Utc>,
    attempt: i32,
    cfg: BackoffConfig,
    rng: &mut R,
) -> DateTime<Utc> {
    let attempt = attempt.max(1) as u32;

    let base = if cfg.base_delay.is_zero() {
        BackoffConfig::default().base_delay
    } else {
        cfg.base_delay
    };
    let max = if cfg.max_delay.is_zero() {
        BackoffConfig::default().max_delay
    } else {
        cfg.max_delay
    };

    let shift = (attempt - 1).min(31);
    let exp = base.saturating_mul(1u32 << shift);
    let delay = exp.min(max);

    let jitter_ms = if delay.is_zero() {
        0
    } else {
        rng.gen_range(0..=delay.as_millis() as u64)
    };

    now + chrono::Duration::milliseconds(jitter_ms as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn first_attempt_stays_within_base_delay() {
        let now = Utc::now();
        let mut rng = StdRng::seed_from_u64(1);
        let cfg = BackoffConfig::default();

        let at = next_retry_at(now, 1, cfg, &mut rng);
        assert!(at >= now);
        assert!(at <= now + chrono::Duration::seconds(1));
    }

    #[test]
    fn large_attempts_are_clamped_to_max_delay() {
        let now = Utc::now();
        let mut rng = StdRng::seed_from_u64(7);
        let cfg = BackoffConfig::default();

        let at = next_retry_at(now, 50, cfg, &mut rng);
        assert!(at <= now + chrono::Duration::seconds(60));
    }

    #[test]
    fn attempt_below_one_is_clamped_to_one() {
        let now = Utc::now();
        let mut rng = StdRng::seed_from_u64(3);
        let cfg = BackoffConfig::default();

        let at = next_retry_at(now, 0, cfg, &mut rng);
        assert!(at <= now + chrono::Duration::seconds(1));
    }

    #[test]
    fn very_large_attempt_counts_do_not_overflow_the_shift() {
        let now = Utc::now();
        let mut rng = StdRng::seed_from_u64(13);
        let cfg = BackoffConfig::default();

        let at = next_retry_at(now, 1000, cfg, &mut rng);
        assert!(at <= now + chrono::Duration::seconds(60));
    }

    #[test]
    fn zero_base_and_max_fall_back_to_defaults() {
        let now = Utc::now();
        let mut rng = StdRng::seed_from_u64(11);
        let cfg = BackoffConfig {
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        };

        let at = next_retry_at(now, 10, cfg, &mut rng);
        assert!(at <= now + chrono::Duration::seconds(60));
    }
}
