//! Retry schedule for the persistence path.
//!
//! Storage writes and reads go through `retry_storage`, which retries
//! transient failures on a linear schedule: the wait after failed
//! attempt N is `base_delay * N`. Quota errors are permanent and never
//! retried; retrying cannot free up the device.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::Result;

/// Retry schedule for storage operations.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first (minimum 1).
    pub attempts: u32,

    /// Base delay unit for the linear schedule.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    /// Schedule with near-zero delays, for tests and interactive hosts.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_millis(1),
        }
    }

    /// Set the total number of attempts (minimum 1).
    #[must_use]
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    /// Set the base delay unit.
    #[must_use]
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Delay to wait after failed attempt `attempt` (1-based).
    fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

/// Run a fallible async storage operation under the policy.
///
/// `StorageFull` propagates immediately. Every other error retries
/// until the schedule is exhausted, then the last error is returned.
pub async fn retry_storage<F, Fut, T>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 1u32;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(
                        operation = %operation_name,
                        attempts = attempt,
                        "Operation succeeded after retries"
                    );
                }
                return Ok(value);
            }
            Err(err) if err.is_storage_full() => {
                debug!(
                    operation = %operation_name,
                    "Storage full, not retrying"
                );
                return Err(err);
            }
            Err(err) => {
                if attempt >= policy.attempts {
                    warn!(
                        operation = %operation_name,
                        attempts = attempt,
                        error = %err,
                        "Retries exhausted"
                    );
                    return Err(err);
                }

                let delay = policy.delay_after(attempt);
                warn!(
                    operation = %operation_name,
                    attempt = attempt,
                    attempts = policy.attempts,
                    next_delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Operation failed, will retry"
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
