//! Exponential backoff with jitter for failed reloads.

use std::time::Duration;
use rand::Rng;

/// Shortest wait between two failed attempts, whatever the policy says.
pub const MIN_RETRY_DELAY: Duration = Duration::from_millis(100);

/// How quickly the reload loop retries after consecutive failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Delay before the next attempt after `failures` consecutive failures.
    ///
    /// Never longer than `ceiling` (the regular reload period), so a failing
    /// backend is polled at least as often as a healthy one, and never
    /// shorter than [`MIN_RETRY_DELAY`] unless the period itself is.
    pub fn delay(&self, failures: u32, ceiling: Duration) -> Duration {
        let backoff = calculate_backoff(
            failures,
            self.base_delay.as_millis() as u64,
            self.max_delay.as_millis() as u64,
        );
        backoff.max(MIN_RETRY_DELAY).min(ceiling)
    }
}

/// Calculate exponential backoff delay with jitter.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let exponential_base = 2u64.saturating_pow(attempt - 1);
    let delay_ms = base_ms.saturating_mul(exponential_base);
    let capped_delay = delay_ms.min(max_ms);

    // Apply jitter (0 to 10% of the delay)
    let jitter_range = capped_delay / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_calculation() {
        let b1 = calculate_backoff(1, 100, 2000);
        assert!(b1.as_millis() >= 100);

        let b2 = calculate_backoff(2, 100, 2000);
        assert!(b2.as_millis() >= 200);

        let max = calculate_backoff(10, 100, 1000);
        assert!(max.as_millis() >= 1000);
        assert!(max.as_millis() < 1100);
    }

    #[test]
    fn test_delay_capped_by_reload_period() {
        let policy = RetryPolicy {
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        };
        let period = Duration::from_secs(5);
        assert!(policy.delay(1, period) >= Duration::from_secs(1));
        assert_eq!(policy.delay(8, period), period);
    }

    #[test]
    fn test_zero_policy_still_waits() {
        let policy = RetryPolicy {
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        };
        for failures in [1, 2, 10] {
            assert_eq!(policy.delay(failures, Duration::from_secs(10)), MIN_RETRY_DELAY);
        }
        assert_eq!(
            policy.delay(3, Duration::from_millis(40)),
            Duration::from_millis(40)
        );
    }
}
