use crate::utils::time::sleep_with_jitter;
use std::future::Future;
use tracing::warn;

/// Exponential backoff settings: `max_attempts` tries in total, waiting
/// `base_delay_ms`, then double that, never more than `max_delay_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 2_000,
            max_delay_ms: 10_000,
        }
    }
}

pub async fn retry_with_backoff<T, F, Fut>(policy: RetryPolicy, operation: F) -> common::Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = common::Result<T>>,
{
    let mut retries = policy.max_attempts.saturating_sub(1);
    let mut delay = policy.base_delay_ms.min(policy.max_delay_ms);

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if retries == 0 {
                    return Err(e);
                }

                warn!(error = %e, retries_left = retries, delay_ms = delay, "Retrying after failure");
                retries -= 1;
                sleep_with_jitter(delay, delay / 2).await;
                delay = (delay * 2).min(policy.max_delay_ms);
            }
        }
    }
}
