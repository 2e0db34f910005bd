//! Retry of transient failures (server errors, dropped connections).
//!
//! Rate limits are handled separately by [`crate::rate_limit`]; this layer
//! only ever sees responses the throttle policy did not claim.

use std::time::Duration;

use reqwest::StatusCode;

/// Retry configuration for transient failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    /// Base delay; retry `n` (0-based) waits `(n + 1)^2 * base_delay`.
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryConfig {
    /// Disable transient retries entirely.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `retry` (0-based).
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = (retry + 1).saturating_mul(retry + 1);
        self.base_delay.saturating_mul(factor)
    }

    /// Whether another retry is allowed after `retries_done` retries.
    #[must_use]
    pub const fn allows(&self, retries_done: u32) -> bool {
        retries_done < self.max_retries
    }
}

/// Server-side failures worth repeating.
#[must_use]
pub fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error()
}

/// Transport failures worth repeating.
#[must_use]
pub fn is_retryable_error(error: &reqwest::Error) -> bool {
    error.is_connect() || error.is_timeout()
}
