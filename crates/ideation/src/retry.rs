use std::future::Future;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::{IdeationError, IdeationResult};

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BASE_DELAY_MS: u64 = 1000;
const DEFAULT_MAX_JITTER_MS: u64 = 1000;
const MAX_BACKOFF_MS: u64 = 60000;

/// Exponential backoff policy for rate-limited provider calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total invocations, first call included
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    /// Upper bound of the random delay added to each backoff
    pub max_jitter_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_jitter_ms: DEFAULT_MAX_JITTER_MS,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay_ms: base_delay.as_millis() as u64,
            ..Self::default()
        }
    }

    pub fn without_jitter(mut self) -> Self {
        self.max_jitter_ms = 0;
        self
    }

    /// `base_delay * 2^(attempt-1)`, attempts counted from 1.
    pub fn base_delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let ms = self
            .base_delay_ms
            .saturating_mul(1u64 << exponent)
            .min(MAX_BACKOFF_MS);
        Duration::from_millis(ms)
    }

    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let jitter_ms = if self.max_jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=self.max_jitter_ms)
        };
        self.base_delay_for_attempt(attempt) + Duration::from_millis(jitter_ms)
    }
}

/// Run `operation`, retrying only rate-limit failures with exponential backoff.
///
/// Any other error is returned after a single invocation. When the final
/// attempt is still rate limited the error is wrapped in
/// [`IdeationError::RetriesExhausted`].
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation_name: &str,
    operation: F,
) -> IdeationResult<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = IdeationResult<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    info!(
                        operation = operation_name,
                        attempt, "Succeeded after rate limit retries"
                    );
                }
                return Ok(result);
            }
            Err(e) if e.is_rate_limited() => {
                if attempt >= max_attempts {
                    error!(
                        operation = operation_name,
                        attempts = attempt,
                        "Rate limited on every attempt, giving up"
                    );
                    return Err(IdeationError::RetriesExhausted {
                        attempts: attempt,
                        source: Box::new(e),
                    });
                }

                let delay = policy.delay_for_attempt(attempt);
                warn!(
                    operation = operation_name,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "Rate limited, backing off before retry"
                );

                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                if attempt > 1 {
                    info!(
                        operation = operation_name,
                        attempt,
                        error = %e,
                        "Failed after rate limit retries"
                    );
                }
                return Err(e);
            }
        }
    }
}
