//! Bounded retry with exponential back-off.

use std::time::Duration;

use rand::Rng;

/// Configuration for automatic retry of transient and rate-limited requests.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Retries after the first attempt; `0` disables retrying.
    pub max_retries: u32,
    /// First back-off; attempt `n` waits `base_delay * factor^n`.
    pub base_delay: Duration,
    pub backoff_factor: f64,
    /// Cap on any single computed wait.
    pub max_backoff: Duration,
    /// Longest server-requested wait (`Retry-After`, `x-ratelimit-reset`) the
    /// client sits out. A rate limit that resets later than this is reported
    /// as [`StoreError::RateLimitExhausted`](toggle::StoreError::RateLimitExhausted).
    pub max_rate_limit_wait: Duration,
    /// Jitter as a fraction of the computed wait (0.1 = ±10%).
    pub jitter: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            backoff_factor: 2.0,
            max_backoff: Duration::from_secs(60),
            max_rate_limit_wait: Duration::from_secs(15 * 60),
            jitter: 0.1,
        }
    }
}

impl RetryConfig {
    /// No retries at all.
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Wait before retry number `attempt` (0-based).
    ///
    /// A server-requested delay wins over the computed schedule and is bounded
    /// by `max_rate_limit_wait`; the computed schedule never exceeds
    /// `max_backoff`.
    pub fn delay_for(&self, attempt: u32, requested: Option<Duration>) -> Duration {
        if let Some(requested) = requested {
            return requested.min(self.max_rate_limit_wait);
        }

        let cap = self.max_backoff.as_secs_f64();
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let raw = self.base_delay.as_secs_f64() * self.backoff_factor.powi(exponent);
        let base = if raw.is_finite() { raw.min(cap) } else { cap };
        let wait = if self.jitter > 0.0 && base > 0.0 {
            let range = base * self.jitter;
            base + rand::thread_rng().gen_range(-range..range)
        } else {
            base
        };

        let capped = wait.clamp(0.0, cap);
        Duration::from_secs_f64(capped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_jitter() -> RetryConfig {
        RetryConfig {
            jitter: 0.0,
            ..RetryConfig::default()
        }
    }

    #[test]
    fn exponential_schedule() {
        let config = no_jitter();
        assert_eq!(config.delay_for(0, None), Duration::from_secs(1));
        assert_eq!(config.delay_for(1, None), Duration::from_secs(2));
        assert_eq!(config.delay_for(2, None), Duration::from_secs(4));
        assert_eq!(config.delay_for(3, None), Duration::from_secs(8));
    }

    #[test]
    fn capped_at_max_backoff() {
        let config = RetryConfig {
            backoff_factor: 10.0,
            max_backoff: Duration::from_secs(30),
            ..no_jitter()
        };
        assert_eq!(config.delay_for(3, None), Duration::from_secs(30));
    }

    #[test]
    fn server_requested_delay_wins_over_max_backoff() {
        let config = no_jitter();
        assert_eq!(
            config.delay_for(0, Some(Duration::from_secs(15))),
            Duration::from_secs(15)
        );
        // A primary rate-limit reset ten minutes out is waited for in full.
        assert_eq!(
            config.delay_for(0, Some(Duration::from_secs(600))),
            Duration::from_secs(600)
        );
        assert_eq!(
            config.delay_for(0, Some(Duration::from_secs(3600))),
            Duration::from_secs(15 * 60)
        );
    }

    #[test]
    fn huge_attempt_counts_stay_at_the_cap() {
        let config = RetryConfig::default();
        for attempt in [64, 1_000, u32::MAX] {
            let d = config.delay_for(attempt, None).as_secs_f64();
            assert!((54.0..=60.0).contains(&d), "delay {d} for attempt {attempt}");
        }
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let config = RetryConfig::default();
        for _ in 0..100 {
            let d = config.delay_for(2, None).as_secs_f64();
            assert!((3.6..=4.4).contains(&d), "delay {d} outside ±10% of 4s");
        }
    }
}
