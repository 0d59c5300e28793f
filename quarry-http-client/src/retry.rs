//! Retry configuration and backoff.

use rand::Rng;
use std::time::Duration;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default backoff base.
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(500);

/// Retry configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Delay between attempts.
    pub backoff: LinearJitterBackoff,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: LinearJitterBackoff::new(DEFAULT_BACKOFF_BASE),
        }
    }
}

impl RetryConfig {
    /// Create a retry config with linear backoff and jitter.
    pub fn linear(max_retries: u32, base: Duration) -> Self {
        Self {
            max_retries,
            backoff: LinearJitterBackoff::new(base),
        }
    }

    /// Create a retry config that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Maximum number of attempts, the first one included.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before the given one-based retry, jittered from the thread RNG.
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        self.backoff.delay_for_retry(retry, &mut rand::rng())
    }
}

/// Linear backoff with uniform jitter.
///
/// The delay before retry `n` is `base * n + uniform[0, base)`, so delays
/// strictly increase with `n` and concurrent callers spread out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearJitterBackoff {
    /// Step added per retry, also the jitter width.
    pub base: Duration,
}

impl LinearJitterBackoff {
    /// Create a backoff with the given base.
    pub fn new(base: Duration) -> Self {
        Self { base }
    }

    /// Delay before the given one-based retry.
    pub fn delay_for_retry<R: Rng>(&self, retry: u32, rng: &mut R) -> Duration {
        let base = u64::try_from(self.base.as_nanos()).unwrap_or(u64::MAX);
        let jitter = if base == 0 {
            0
        } else {
            rng.random_range(0..base)
        };

        Duration::from_nanos(base.saturating_mul(u64::from(retry)).saturating_add(jitter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_default_retry_config() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.max_attempts(), 4);
        assert_eq!(config.backoff.base, Duration::from_millis(500));
    }

    #[test]
    fn test_no_retry() {
        assert_eq!(RetryConfig::none().max_attempts(), 1);
    }

    #[test]
    fn test_linear_backoff_bounds() {
        let backoff = LinearJitterBackoff::new(Duration::from_millis(500));

        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            for retry in 1..=3u32 {
                let delay = backoff.delay_for_retry(retry, &mut rng);
                assert!(delay >= Duration::from_millis(500) * retry);
                assert!(delay < Duration::from_millis(500) * retry + Duration::from_millis(500));
            }
        }
    }

    #[test]
    fn test_linear_backoff_strictly_increases() {
        let backoff = LinearJitterBackoff::new(Duration::from_millis(500));
        let mut rng = StdRng::seed_from_u64(7);

        let delays: Vec<Duration> = (1..=3)
            .map(|retry| backoff.delay_for_retry(retry, &mut rng))
            .collect();

        assert!(delays.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_linear_backoff_deterministic_for_seed() {
        let backoff = LinearJitterBackoff::new(Duration::from_millis(500));
        let first = backoff.delay_for_retry(2, &mut StdRng::seed_from_u64(42));
        let second = backoff.delay_for_retry(2, &mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_base_has_no_delay() {
        let backoff = LinearJitterBackoff::new(Duration::ZERO);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(backoff.delay_for_retry(3, &mut rng), Duration::ZERO);
    }
}
