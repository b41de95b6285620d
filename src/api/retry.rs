//! Bounded retry policy for chat requests
//!
//! Implements a fixed-budget retry strategy:
//! - Max attempts: 3 by default, counted from 1
//! - Delay: linear, 1s after the first failure, 2s after the second
//! - Every failure is retryable; only the attempt budget stops the loop

use crate::errors::{ChatError, Result};
use std::time::Duration;
use tokio::time::sleep;

/// Default number of attempts per request
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Base delay between attempts (1 second)
const BASE_DELAY_MS: u64 = 1000;

/// Linear-backoff retry policy
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempt budget, including the first try
    max_attempts: u32,

    /// Base delay in milliseconds, scaled by the attempt number
    base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryPolicy {
    /// Create a policy with the default attempt budget
    pub fn new() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: BASE_DELAY_MS,
        }
    }

    /// Create a policy with a custom attempt budget
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay_ms: BASE_DELAY_MS,
        }
    }

    /// Execute an operation under the retry budget.
    ///
    /// The operation receives the 1-based attempt number. The first success
    /// returns immediately; a failure on the final attempt returns the last
    /// captured error without any further delay.
    pub async fn execute_with_retry<F, Fut, T>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut last_error = None;

        for attempt in 1..=self.max_attempts {
            match operation(attempt).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    last_error = Some(e);

                    if attempt < self.max_attempts {
                        sleep(self.delay_for(attempt)).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or(ChatError::RetryExhausted))
    }

    /// Delay after the given 1-based attempt number
    fn delay_for(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.base_delay_ms * u64::from(attempt))
    }

    /// Get the attempt budget
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_success_first_attempt() {
        let policy = RetryPolicy::new();

        let attempt_count = Arc::new(Mutex::new(0));
        let count_clone = attempt_count.clone();

        let result = policy
            .execute_with_retry(move |_attempt| {
                let count = count_clone.clone();
                async move {
                    *count.lock().unwrap() += 1;
                    Ok::<i32, ChatError>(42)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(*attempt_count.lock().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_failures() {
        let policy = RetryPolicy::new();

        let result = policy
            .execute_with_retry(|attempt| async move {
                if attempt < 3 {
                    Err(ChatError::MidStream("transient".to_string()))
                } else {
                    Ok(attempt)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_returns_last_error() {
        let policy = RetryPolicy::new();

        let attempt_count = Arc::new(Mutex::new(0));
        let count_clone = attempt_count.clone();

        let result: Result<i32> = policy
            .execute_with_retry(move |attempt| {
                let count = count_clone.clone();
                async move {
                    *count.lock().unwrap() += 1;
                    Err(ChatError::MidStream(format!("failure {}", attempt)))
                }
            })
            .await;

        match result {
            Err(ChatError::MidStream(msg)) => assert_eq!(msg, "failure 3"),
            other => panic!("expected last captured error, got {:?}", other),
        }
        assert_eq!(*attempt_count.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_zero_budget_falls_back_to_generic_error() {
        let policy = RetryPolicy::with_max_attempts(0);

        let result: Result<i32> = policy
            .execute_with_retry(|_attempt| async move {
                panic!("operation must not run with an empty budget")
            })
            .await;

        assert!(matches!(result, Err(ChatError::RetryExhausted)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_delay_after_final_failure() {
        let policy = RetryPolicy::with_max_attempts(1);
        let started = tokio::time::Instant::now();

        let result: Result<i32> = policy
            .execute_with_retry(|_attempt| async move {
                Err(ChatError::MidStream("only attempt".to_string()))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_delay_is_linear() {
        let policy = RetryPolicy::new();

        assert_eq!(policy.delay_for(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(3000));
    }

    #[test]
    fn test_attempt_budget_accessor() {
        assert_eq!(RetryPolicy::new().max_attempts(), DEFAULT_MAX_ATTEMPTS);
        assert_eq!(RetryPolicy::with_max_attempts(5).max_attempts(), 5);
    }
}
