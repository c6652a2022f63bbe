//! Retry with exponential backoff, applied by callers of the session.

use crate::McpClientResult;
use std::time::Duration;
use tokio::time::sleep;
use toolbridge_error::RetryableError;
use tracing::{debug, warn};

/// Retry configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first.
    pub max_attempts: usize,
    /// Initial backoff duration.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
    /// Backoff multiplier.
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// A single attempt, never retried.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Default backoff with a different attempt budget.
    pub fn with_max_attempts(max_attempts: usize) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }
}

/// Retries an operation with exponential backoff.
///
/// Only errors whose [`RetryableError::is_retryable`] holds are retried.
pub async fn retry_with_backoff<F, Fut, T>(
    config: &RetryConfig,
    mut operation: F,
) -> McpClientResult<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = McpClientResult<T>>,
{
    let mut attempt = 0;
    let mut backoff = config.initial_backoff;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!(attempt, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(err) => {
                if attempt >= config.max_attempts {
                    if config.max_attempts > 1 {
                        warn!(attempt, error = %err, "All retry attempts exhausted");
                    }
                    return Err(err);
                }

                if !err.is_retryable() {
                    debug!(error = %err, "Error is not retryable, failing immediately");
                    return Err(err);
                }

                debug!(attempt, backoff_ms = backoff.as_millis(), "Retrying after failure");
                sleep(backoff).await;

                backoff = std::cmp::min(
                    Duration::from_secs_f64(backoff.as_secs_f64() * config.backoff_multiplier),
                    config.max_backoff,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{McpClientError, McpClientErrorKind};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use toolbridge_error::{TransportError, TransportErrorKind};

    fn quick(max_attempts: usize) -> RetryConfig {
        RetryConfig {
            max_attempts,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(2),
            backoff_multiplier: 2.0,
        }
    }

    #[tokio::test]
    async fn test_retryable_errors_are_retried_until_success() {
        let counter = AtomicUsize::new(0);
        let attempts = &counter;
        let result = retry_with_backoff(&quick(3), || async move {
            if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(TransportError::new(TransportErrorKind::Network("reset".into())).into())
            } else {
                Ok(7)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_errors_fail_immediately() {
        let counter = AtomicUsize::new(0);
        let attempts = &counter;
        let result: McpClientResult<()> = retry_with_backoff(&quick(5), || async move {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(McpClientError::new(McpClientErrorKind::ToolNotFound("x".into())))
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
