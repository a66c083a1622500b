use std::time::Duration;

/// Bounded retry with linear backoff. The default makes exactly one attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retry number `retry` (1-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.backoff.checked_mul(retry).unwrap_or(Duration::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_single_attempt() {
        assert_eq!(RetryPolicy::default().max_attempts(), 1);
    }

    #[test]
    fn test_linear_backoff() {
        let policy = RetryPolicy::new(3, Duration::from_millis(50));
        assert_eq!(policy.max_attempts(), 4);
        assert_eq!(policy.delay_for(1), Duration::from_millis(50));
        assert_eq!(policy.delay_for(3), Duration::from_millis(150));
    }

    #[test]
    fn test_extreme_settings_saturate() {
        let policy = RetryPolicy::new(u32::MAX, Duration::from_millis(u64::MAX));
        assert_eq!(policy.max_attempts(), u32::MAX);
        assert_eq!(policy.delay_for(u32::MAX), Duration::MAX);
    }
}
