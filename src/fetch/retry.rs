//! Fixed-delay retry for remote operations
//!
//! Retries are capped and only apply to retryable failures (timeouts,
//! connection failures, 5xx, 429); everything else re-raises immediately.
//! Retrying has no side effect on shared state beyond sleeping.

use crate::fetch::FetchError;
use std::future::Future;
use std::time::Duration;

/// Retry configuration: additional attempts after the first failure, and
/// the fixed delay between attempts
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }
}

/// Executes `op`, retrying on retryable failures
///
/// The operation runs at most `max_retries + 1` times. On exhaustion or a
/// non-retryable failure the final error is re-raised to the caller.
///
/// # Arguments
///
/// * `policy` - Retry cap and inter-attempt delay
/// * `op` - The operation; invoked once per attempt
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;

        match op().await {
            Ok(value) => return Ok(value),
            Err(error) if attempt <= policy.max_retries && error.is_retryable() => {
                tracing::warn!(
                    attempt,
                    max_retries = policy.max_retries,
                    error = %error,
                    "Attempt failed, retrying in {:?}",
                    policy.delay
                );
                tokio::time::sleep(policy.delay).await;
            }
            Err(error) => {
                tracing::error!(
                    attempt,
                    error = %error,
                    "All attempts exhausted or non-retryable error"
                );
                return Err(error);
            }
        }
    }
}
