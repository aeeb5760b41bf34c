//! Retry policy for outbound requests.

use std::time::Duration;

use crate::config::HttpConfig;

/// Default retry budget (retries after the first attempt).
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Server-side statuses considered transient.
pub const RETRY_STATUSES: [u16; 4] = [500, 502, 503, 504];

/// Bounded retry with linear backoff.
///
/// Retry `n` (1-based) waits `n * backoff_step` before being sent, so the
/// default policy sleeps 1s, 2s, 3s and gives up after the fourth attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_step: Duration,
    pub retry_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_step: Duration::from_secs(1),
            retry_statuses: RETRY_STATUSES.to_vec(),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff_step: Duration) -> Self {
        Self {
            max_retries,
            backoff_step,
            ..Default::default()
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn from_config(config: &HttpConfig) -> Self {
        Self::new(config.max_retries, Duration::from_millis(config.backoff_ms))
    }

    pub fn should_retry_status(&self, status: u16) -> bool {
        self.retry_statuses.contains(&status)
    }

    /// Delay before retry number `retry` (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        self.backoff_step * retry
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }
}
