//! Retry utility for transient failures in async operations
//!
//! Provides a linear-backoff retry loop where the caller decides which
//! failures are worth retrying; everything else aborts on first occurrence.

use std::time::Duration;
use tokio::time::sleep;

/// Retry policy with linear backoff: the wait before attempt `n + 1` is
/// `base_delay * n`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

/// Execute an async operation, retrying failures accepted by `is_retryable`.
///
/// Failures the classifier rejects are returned immediately without further
/// attempts. On exhaustion the last failure is returned.
pub async fn retry_async<F, T, E, Fut>(
    operation_name: &str,
    policy: &RetryPolicy,
    is_retryable: impl Fn(&E) -> bool,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut last_error = None;

    for attempt in 1..=policy.max_attempts {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(error) => {
                if !is_retryable(&error) {
                    log::warn!(
                        "Operation '{}' failed on attempt {}/{} with a non-retryable error: {}",
                        operation_name,
                        attempt,
                        policy.max_attempts,
                        error
                    );
                    return Err(error);
                }

                log::warn!(
                    "Operation '{}' failed on attempt {}/{}: {}",
                    operation_name,
                    attempt,
                    policy.max_attempts,
                    error
                );
                last_error = Some(error);

                if attempt < policy.max_attempts {
                    let delay = policy.base_delay * attempt as u32;
                    log::debug!(
                        "Operation '{}' retrying in {:?}",
                        operation_name,
                        delay
                    );
                    sleep(delay).await;
                }
            }
        }
    }

    log::error!(
        "Operation '{}' failed after {} attempts",
        operation_name,
        policy.max_attempts
    );
    Err(last_error.expect("at least one attempt was made"))
}
