// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded-attempt retry around an async operation.

use std::future::Future;
use std::time::Duration;

use emblem_config::model::RetryConfig;
use emblem_core::EmblemError;
use tracing::{debug, warn};

/// How many times to retry and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the initial attempt.
    pub max_retries: u32,
    /// Delay before each retry. Zero retries immediately.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Duration::ZERO,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff: Duration::from_millis(config.backoff_ms),
        }
    }
}

/// Runs an operation up to `max_retries + 1` times.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Runs `op` until it succeeds or the attempts are used up.
    ///
    /// Each failed attempt is logged with its attempt number. On exhaustion
    /// the error from the final attempt is returned unchanged.
    pub async fn run<F, Fut, T>(&self, label: &str, mut op: F) -> Result<T, EmblemError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, EmblemError>>,
    {
        let max_attempts = self.policy.max_retries.saturating_add(1);
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            if attempt > 1 && !self.policy.backoff.is_zero() {
                tokio::time::sleep(self.policy.backoff).await;
            }

            match op().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(operation = label, attempt, "succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) => {
                    warn!(
                        operation = label,
                        attempt,
                        max_attempts,
                        error = %e,
                        "attempt failed"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(EmblemError::RetryExhausted))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use tracing_test::traced_test;

    use super::*;

    fn executor(max_retries: u32) -> RetryExecutor {
        RetryExecutor::new(RetryPolicy {
            max_retries,
            backoff: Duration::ZERO,
        })
    }

    fn provider_error(message: String) -> EmblemError {
        EmblemError::Provider {
            message,
            source: None,
        }
    }

    #[tokio::test]
    async fn success_on_first_attempt_runs_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let result = executor(3)
            .run("test", || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, EmblemError>(42) }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn always_failing_makes_k_plus_one_attempts_and_keeps_last_error() {
        for k in [0_u32, 1, 3, 5] {
            let calls = Arc::new(AtomicU32::new(0));
            let counter = Arc::clone(&calls);

            let result: Result<(), _> = executor(k)
                .run("test", || {
                    let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    async move { Err(provider_error(format!("attempt {n}"))) }
                })
                .await;

            assert_eq!(calls.load(Ordering::SeqCst), k + 1);
            match result {
                Err(EmblemError::Provider { message, .. }) => {
                    assert_eq!(message, format!("attempt {}", k + 1));
                }
                other => panic!("expected provider error, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn late_success_makes_j_plus_one_attempts() {
        let k = 4;
        for j in 0..k {
            let calls = Arc::new(AtomicU32::new(0));
            let counter = Arc::clone(&calls);

            let result = executor(k)
                .run("test", || {
                    let n = counter.fetch_add(1, Ordering::SeqCst);
                    async move {
                        if n < j {
                            Err(provider_error("transient".into()))
                        } else {
                            Ok("done")
                        }
                    }
                })
                .await;

            assert_eq!(result.unwrap(), "done");
            assert_eq!(calls.load(Ordering::SeqCst), j + 1);
        }
    }

    #[tokio::test]
    async fn error_kind_is_preserved() {
        let result: Result<(), _> = executor(1)
            .run("test", || async {
                Err(EmblemError::ProviderRefusal {
                    provider: "fal".into(),
                    reason: "nsfw".into(),
                })
            })
            .await;
        assert!(matches!(result, Err(EmblemError::ProviderRefusal { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_waits_between_attempts() {
        let start = tokio::time::Instant::now();
        let exec = RetryExecutor::new(RetryPolicy {
            max_retries: 2,
            backoff: Duration::from_millis(200),
        });

        let _: Result<(), _> = exec
            .run("test", || async { Err(provider_error("down".into())) })
            .await;

        assert!(start.elapsed() >= Duration::from_millis(400));
    }

    #[tokio::test]
    #[traced_test]
    async fn logs_each_failed_attempt() {
        let _: Result<(), _> = executor(2)
            .run("analysis", || async { Err(provider_error("down".into())) })
            .await;

        assert!(logs_contain("attempt=1"));
        assert!(logs_contain("attempt=3"));
        assert!(logs_contain("attempt failed"));
    }

    #[test]
    fn policy_from_config() {
        let policy = RetryPolicy::from(&RetryConfig {
            max_retries: 2,
            backoff_ms: 150,
        });
        assert_eq!(policy.max_retries, 2);
        assert_eq!(policy.backoff, Duration::from_millis(150));
    }
}
