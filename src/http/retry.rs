//! Retry stage: bounded attempts with exponential backoff and jitter.
//!
//! Retries transport failures, per-attempt deadline expiry and responses whose
//! status is in the retryable set. When the budget runs out the last outcome
//! is returned as-is: a response for a status failure, an error for a
//! transport failure.

use async_trait::async_trait;
use rand::Rng;
use reqwest::StatusCode;
use std::collections::HashSet;
use std::time::Duration;

use super::pipeline::{HttpResult, Next, Policy};
use super::{HttpError, HttpRequest, HttpResponse};
use crate::types::RetryConfig;

/// Retry policy. Attempt counters live on the stack of each dispatch.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    retryable_statuses: HashSet<u16>,
    attempt_timeout: Option<Duration>,
}

impl RetryPolicy {
    pub fn new(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: config.base_delay,
            max_delay: config.max_delay.max(config.base_delay),
            retryable_statuses: config.retryable_statuses.iter().copied().collect(),
            attempt_timeout: None,
        }
    }

    /// Deadline applied to attempts whose request carries none.
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = Some(timeout);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn is_retryable_status(&self, status: StatusCode) -> bool {
        self.retryable_statuses.contains(&status.as_u16())
    }

    /// Delay before retry number `retry` (1-based).
    ///
    /// Exponential ceiling `base * 2^(retry-1)` with full jitter above the
    /// floor, always within `[base_delay, max_delay]`.
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        let base_ms = self.base_delay.as_millis() as u64;
        let max_ms = self.max_delay.as_millis() as u64;
        let shift = retry.saturating_sub(1).min(31);
        let ceiling_ms = base_ms.saturating_mul(1u64 << shift).min(max_ms);

        let jittered_ms = if ceiling_ms > base_ms {
            rand::thread_rng().gen_range(base_ms..=ceiling_ms)
        } else {
            ceiling_ms
        };

        Duration::from_millis(jittered_ms).clamp(self.base_delay, self.max_delay)
    }

    fn delay_for(&self, retry: u32, response: Option<&HttpResponse>) -> Duration {
        let delay = self.backoff_delay(retry);
        match response.and_then(HttpResponse::retry_after) {
            Some(hint) => delay.max(hint).min(self.max_delay),
            None => delay,
        }
    }

    async fn attempt(&self, next: Next<'_>, request: HttpRequest) -> HttpResult {
        match request.timeout.or(self.attempt_timeout) {
            Some(deadline) => match tokio::time::timeout(deadline, next.run(request)).await {
                Ok(result) => result,
                Err(_elapsed) => Err(HttpError::timeout(format!(
                    "no response within {:?}",
                    deadline
                ))),
            },
            None => next.run(request).await,
        }
    }

    /// Why the outcome deserves another attempt, if it does.
    fn retry_reason(&self, outcome: &HttpResult) -> Option<String> {
        match outcome {
            Ok(response) if self.is_retryable_status(response.status) => {
                Some(format!("status {}", response.status.as_u16()))
            }
            Ok(_) => None,
            Err(err) if err.is_retryable() => Some(err.to_string()),
            Err(_) => None,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(&RetryConfig::default())
    }
}

#[async_trait]
impl Policy for RetryPolicy {
    fn name(&self) -> &'static str {
        "retry"
    }

    async fn handle(&self, request: HttpRequest, next: Next<'_>) -> HttpResult {
        let mut attempt: u32 = 1;
        loop {
            let outcome = self.attempt(next, request.clone()).await;

            let Some(reason) = self.retry_reason(&outcome) else {
                return outcome;
            };

            if attempt >= self.max_attempts {
                tracing::warn!(
                    attempts = attempt,
                    reason = %reason,
                    "http_retry_exhausted"
                );
                return outcome;
            }

            let delay = self.delay_for(attempt, outcome.as_ref().ok());
            tracing::debug!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                reason = %reason,
                "http_retry_scheduled"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
