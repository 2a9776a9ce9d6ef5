//! Retries with exponential backoff for idempotent RPC reads.

use std::future::Future;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::time::sleep;

use crate::config::RetryConfig;
use crate::errors::StoreError;

#[derive(Clone)]
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Run `operation` until it succeeds, fails with an error that is not
    /// [`StoreError::is_retryable`], or `max_retries` retries are spent.
    ///
    /// Only for reads: a request that may have had effects must not be
    /// replayed.
    pub async fn execute_with<F, Fut, T, E>(&self, operation: F) -> Result<T, StoreError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<StoreError>,
    {
        let mut retries = 0;
        loop {
            let err = match operation().await {
                Ok(value) => return Ok(value),
                Err(e) => e.into(),
            };
            if !err.is_retryable() || retries >= self.config.max_retries {
                return Err(err);
            }

            let delay = self.backoff_ms(retries, err.retry_hint_ms());
            let wait = delay + jitter(delay);
            retries += 1;
            tracing::warn!(retries, delay_ms = wait, error = %err, "Retrying RPC request");
            sleep(Duration::from_millis(wait)).await;
        }
    }

    /// Delay before retry number `retries + 1`, raised to `hint` if the error
    /// carried one and capped at `max_delay_ms`.
    fn backoff_ms(&self, retries: u32, hint: Option<u64>) -> u64 {
        let factor = self.config.backoff_multiplier.max(1.0).powi(retries as i32);
        let delay = (self.config.initial_delay_ms as f64 * factor) as u64;
        delay.max(hint.unwrap_or(0)).min(self.config.max_delay_ms)
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_millis(self.config.confirmation_timeout_ms)
    }

    /// Delay between signature status polls.
    pub fn confirmation_poll_interval(&self) -> Duration {
        Duration::from_millis(self.config.confirmation_poll_ms)
    }
}

/// 0-25% of `delay`, seeded from the clock.
fn jitter(delay: u64) -> u64 {
    let max = delay / 4;
    if max == 0 {
        return 0;
    }
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    u64::from(nanos) % max
}
