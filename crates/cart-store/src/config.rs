use std::time::Duration;

use tracing::debug;

use crate::snapshot::DEFAULT_SNAPSHOT_KEY;

/// How snapshot writes are retried when the backend rejects them.
///
/// Backoff doubles after every failed attempt, starting at `backoff_base`
/// and never exceeding `backoff_max`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per write, including the first. Values below 1 count as 1.
    pub max_attempts: u32,
    /// Delay after the first failure.
    pub backoff_base: Duration,
    /// Upper bound on any single delay.
    pub backoff_max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_millis(50),
            backoff_max: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// A single attempt with no retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            backoff_base: Duration::ZERO,
            backoff_max: Duration::ZERO,
        }
    }

    /// Number of attempts a write gets.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.backoff_base
            .saturating_mul(factor)
            .min(self.backoff_max)
    }

    pub(crate) async fn wait_before_retry(&self, attempt: u32) {
        let delay = self.backoff(attempt);
        if delay.is_zero() {
            return;
        }
        debug!(?delay, attempt, "waiting before retrying cart snapshot write");
        tokio::time::sleep(delay).await;
    }
}

/// Configuration for [`CartStore`](crate::CartStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartStoreConfig {
    /// Storage key the snapshot is read from and written to.
    pub snapshot_key: String,
    /// Retry behaviour for snapshot writes.
    pub retry: RetryPolicy,
}

impl Default for CartStoreConfig {
    fn default() -> Self {
        Self {
            snapshot_key: DEFAULT_SNAPSHOT_KEY.to_owned(),
            retry: RetryPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 10,
            backoff_base: Duration::from_millis(100),
            backoff_max: Duration::from_millis(500),
        };

        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(400));
        assert_eq!(policy.backoff(4), Duration::from_millis(500));
        assert_eq!(policy.backoff(40), Duration::from_millis(500));
    }

    #[test]
    fn attempts_never_below_one() {
        let policy = RetryPolicy {
            max_attempts: 0,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.attempts(), 1);
        assert_eq!(RetryPolicy::none().attempts(), 1);
    }

    #[test]
    fn default_key() {
        assert_eq!(CartStoreConfig::default().snapshot_key, "@Cart");
    }
}
