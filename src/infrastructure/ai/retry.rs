//! Exponential backoff for transient provider failures

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::application::ports::outbound::AiError;

/// Retry schedule for provider calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(2000),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// Retry immediately; for tests against mock servers
    pub fn immediate() -> Self {
        Self {
            initial_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Delay before the given retry (1-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.initial_delay * self.multiplier.saturating_pow(retry.saturating_sub(1))
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// the retries run out. The last error is returned.
pub async fn retry_with_backoff<F, Fut, T>(
    policy: &RetryPolicy,
    provider: &str,
    mut operation: F,
) -> Result<T, AiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AiError>>,
{
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        debug!(provider, attempt, "Calling provider");

        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt <= policy.max_retries => {
                let delay = policy.delay_for(attempt);
                warn!(
                    provider,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Transient provider error, retrying"
                );
                sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
