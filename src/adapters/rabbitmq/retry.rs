//! Bounded retry for publishing.
//!
//! The delay before retry `n` (counting from zero) is
//! `min(interval_start + n * interval_step, interval_max)`.

use std::future::Future;
use std::time::Duration;

use crate::config::RabbitMqConfig;
use crate::ports::PublishError;

/// Retry policy applied to transient publish failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub interval_start: Duration,
    pub interval_step: Duration,
    pub interval_max: Duration,
    /// Retries after the first attempt.
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval_start: Duration::ZERO,
            interval_step: Duration::from_secs(2),
            interval_max: Duration::from_secs(30),
            max_retries: 30,
        }
    }
}

impl From<&RabbitMqConfig> for RetryPolicy {
    fn from(config: &RabbitMqConfig) -> Self {
        Self {
            interval_start: Duration::from_secs(config.retry_interval_start_secs),
            interval_step: Duration::from_secs(config.retry_interval_step_secs),
            interval_max: Duration::from_secs(config.retry_interval_max_secs),
            max_retries: config.retry_max_retries,
        }
    }
}

impl RetryPolicy {
    /// A policy that gives up after the first failure.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry `retry` (0-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let delay = self
            .interval_step
            .checked_mul(retry)
            .and_then(|step| self.interval_start.checked_add(step))
            .unwrap_or(self.interval_max);
        delay.min(self.interval_max)
    }

    /// Runs `operation` until it succeeds, fails permanently, or the
    /// retries run out.
    ///
    /// Only errors for which [`PublishError::is_retryable`] holds are
    /// retried; others are returned immediately.
    pub async fn run<F, Fut, T>(&self, mut operation: F) -> Result<T, PublishError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, PublishError>>,
    {
        let mut retry = 0;
        loop {
            let error = match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => e,
            };

            if retry >= self.max_retries {
                return Err(PublishError::RetriesExhausted {
                    attempts: retry + 1,
                    last_error: error.to_string(),
                });
            }

            let delay = self.delay_for(retry);
            tracing::warn!(
                attempt = retry + 1,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Publish failed, retrying"
            );
            tokio::time::sleep(delay).await;
            retry += 1;
        }
    }
}
