//! Bounded retry with exponential backoff around provider calls.

use std::time::Duration;

use crate::error::Result;
use crate::TextCompletion;

/// Retry schedule for transient provider failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first call
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Delay before the retry following the given 1-based attempt.
    /// Doubles per attempt: base, 2*base, 4*base, ...
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

/// Run `client.complete(prompt)` under the retry policy.
///
/// Transient failures are retried with exponential backoff until the budget
/// is exhausted; permanent failures return immediately. Shared by every
/// pipeline stage that calls the provider.
pub async fn complete_with_retry(
    client: &dyn TextCompletion,
    prompt: &str,
    policy: RetryPolicy,
) -> Result<String> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match client.complete(prompt).await {
            Ok(text) => return Ok(text),
            Err(err) if err.is_transient() && attempt < policy.max_attempts => {
                tokio::time::sleep(policy.delay_after(attempt)).await;
            }
            Err(err) => return Err(err),
        }
    }
}
