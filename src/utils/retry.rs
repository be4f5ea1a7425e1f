use std::future::Future;
use std::time::Duration;

use tokio_retry::RetryIf;
use tokio_retry::strategy::FixedInterval;

use crate::config::RetryConfig;

/// Bounded retry with a fixed delay between attempts.
///
/// `max_attempts` counts the first try, so a policy of 3 makes at most two
/// retries. Only errors accepted by the caller's predicate are retried; any
/// other error is returned straight away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            delay: Duration::from_millis(config.delay_ms),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, delay: Duration) -> Self {
        Self { max_attempts, delay }
    }

    /// Runs `action` until it succeeds, fails with a non-retryable error, or
    /// the attempt budget is spent. The action receives the 1-based attempt
    /// number. On exhaustion the last error is returned.
    pub async fn run<T, E, A, Fut, C>(&self, mut action: A, is_retryable: C) -> Result<T, E>
    where
        A: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        C: FnMut(&E) -> bool,
    {
        let retries = self.max_attempts.saturating_sub(1);
        let strategy = FixedInterval::new(self.delay).take(retries);

        let mut attempt = 0;
        RetryIf::start(
            strategy,
            || {
                attempt += 1;
                action(attempt)
            },
            is_retryable,
        )
        .await
    }
}
