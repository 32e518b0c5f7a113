//! Retry with exponential backoff
//!
//! Used for the station lock: an `open` command that fails on a network blip
//! is simply sent again, which is harmless for the hardware.

use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first one).
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Multiplier applied to the delay after each retry.
    pub backoff_multiplier: f64,
    /// Upper bound for a single delay.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(200),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryConfig {
    /// Single attempt, no retry.
    pub fn once() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }
}

/// Run `operation` until it succeeds, `should_retry` rejects the error, or
/// `max_attempts` is exhausted. The last error is returned.
pub async fn retry_with_backoff<F, Fut, T, E>(
    config: &RetryConfig,
    mut operation: F,
    should_retry: impl Fn(&E) -> bool,
    operation_name: &str,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let attempts = config.max_attempts.max(1);
    let mut delay = config.initial_delay;
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    info!(operation = operation_name, attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if attempt >= attempts || !should_retry(&err) => {
                warn!(
                    operation = operation_name,
                    attempt,
                    max_attempts = attempts,
                    error = %err,
                    "Operation failed permanently"
                );
                return Err(err);
            }
            Err(err) => {
                warn!(
                    operation = operation_name,
                    attempt,
                    max_attempts = attempts,
                    error = %err,
                    retry_in_ms = delay.as_millis() as u64,
                    "Transient failure, retrying"
                );
                tokio::time::sleep(delay).await;
                delay = Duration::from_secs_f64(
                    (delay.as_secs_f64() * config.backoff_multiplier)
                        .min(config.max_delay.as_secs_f64()),
                );
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            initial_delay: Duration::from_millis(1),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_millis(4),
        }
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = retry_with_backoff(
            &fast(3),
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n < 3 {
                        Err(format!("attempt {n} failed"))
                    } else {
                        Ok(n)
                    }
                }
            },
            |_| true,
            "test",
        )
        .await;
        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), String> = retry_with_backoff(
            &fast(2),
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("down".to_string()) }
            },
            |_| true,
            "test",
        )
        .await;
        assert_eq!(result, Err("down".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn permanent_error_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), String> = retry_with_backoff(
            &fast(5),
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("unknown command".to_string()) }
            },
            |_| false,
            "test",
        )
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
