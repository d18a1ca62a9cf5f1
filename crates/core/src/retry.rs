//! Injectable retry policy with exponential backoff.
//!
//! Collaborator call sites receive a policy instead of wrapping methods in
//! ad-hoc backoff decorators, so tests can inject a zero-delay policy.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Classifies an error as transient (worth retrying) or final.
pub trait Transient {
    fn is_transient(&self) -> bool;
}

/// Bounded exponential backoff. The delay doubles after every failed attempt.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Policy for tests: same attempt count, no sleeping.
    pub fn no_delay(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    /// Run `op` until it succeeds, returns a non-transient error, or the
    /// attempt budget is exhausted.
    pub async fn run<T, E, F, Fut>(&self, op_name: &str, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Transient + Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut backoff = self.base_delay;

        for attempt in 1..=max_attempts {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < max_attempts => {
                    tracing::warn!(
                        op = op_name,
                        attempt,
                        max_attempts,
                        error = %err,
                        "transient failure, retrying after {:?}",
                        backoff
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
                Err(err) => return Err(err),
            }
        }

        unreachable!("retry loop always returns within max_attempts")
    }
}
