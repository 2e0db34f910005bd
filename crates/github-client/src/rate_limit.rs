//! # Rate-limit classification and throttle policy
//!
//! GitHub signals throttling in three different ways and each one gets its
//! own retry behaviour:
//!
//! | kind      | detection                                            | retried       |
//! |-----------|------------------------------------------------------|---------------|
//! | primary   | 403/429 with `x-ratelimit-remaining: 0`              | at most once  |
//! | secondary | 403/429 whose message mentions "secondary rate"      | never         |
//! | abuse     | 403/429 whose message mentions "abuse"               | always        |
//!
//! Classification is a pure function of the response so it can be tested
//! without a server; the [`ThrottlePolicy`] decides what to do with it.

use std::fmt;

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;

/// Delay used when a secondary or abuse signal carries no `retry-after`.
pub const FALLBACK_RETRY_AFTER_SECS: u64 = 60;

/// The three throttling signals GitHub can return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateLimitKind {
    /// Hourly request quota exhausted.
    Primary,
    /// Secondary (concurrency / burst) limit.
    Secondary,
    /// Legacy abuse-detection mechanism.
    Abuse,
}

impl RateLimitKind {
    /// Lowercase name used in logs and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Abuse => "abuse",
        }
    }
}

impl fmt::Display for RateLimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A throttling signal observed on one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEvent {
    /// Which limit was hit.
    pub kind: RateLimitKind,
    /// Server-requested delay before retrying.
    pub retry_after_secs: u64,
    /// Retries already spent on this kind for the same request.
    pub attempt_count: u32,
}

/// Decides whether a rate-limit event is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottlePolicy {
    /// Retries allowed per request after a primary rate-limit hit.
    pub max_primary_retries: u32,
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        Self {
            max_primary_retries: 1,
        }
    }
}

impl ThrottlePolicy {
    /// Whether the request that produced `event` should be sent again.
    #[must_use]
    pub fn should_retry(&self, event: &RateLimitEvent) -> bool {
        match event.kind {
            RateLimitKind::Primary => event.attempt_count < self.max_primary_retries,
            RateLimitKind::Secondary => false,
            RateLimitKind::Abuse => true,
        }
    }
}

/// Per-request retry bookkeeping, one counter per kind.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThrottleState {
    primary: u32,
    secondary: u32,
    abuse: u32,
}

impl ThrottleState {
    /// Build the event for a freshly classified signal.
    #[must_use]
    pub fn event(&self, kind: RateLimitKind, retry_after_secs: u64) -> RateLimitEvent {
        let attempt_count = match kind {
            RateLimitKind::Primary => self.primary,
            RateLimitKind::Secondary => self.secondary,
            RateLimitKind::Abuse => self.abuse,
        };
        RateLimitEvent {
            kind,
            retry_after_secs,
            attempt_count,
        }
    }

    /// Record that a retry is being spent on `kind`.
    pub fn record_retry(&mut self, kind: RateLimitKind) {
        let counter = match kind {
            RateLimitKind::Primary => &mut self.primary,
            RateLimitKind::Secondary => &mut self.secondary,
            RateLimitKind::Abuse => &mut self.abuse,
        };
        *counter = counter.saturating_add(1);
    }
}

/// Classify a failed response as a rate-limit signal.
///
/// Returns the kind and the delay GitHub asked for, or `None` when the
/// response is an ordinary error.
#[must_use]
pub fn classify(
    status: StatusCode,
    headers: &HeaderMap,
    message: &str,
    now: DateTime<Utc>,
) -> Option<(RateLimitKind, u64)> {
    if status != StatusCode::FORBIDDEN && status != StatusCode::TOO_MANY_REQUESTS {
        return None;
    }

    let lowered = message.to_ascii_lowercase();
    let retry_after = header_u64(headers, "retry-after");

    if lowered.contains("secondary rate") {
        return Some((
            RateLimitKind::Secondary,
            retry_after.unwrap_or(FALLBACK_RETRY_AFTER_SECS),
        ));
    }

    if lowered.contains("abuse") {
        return Some((
            RateLimitKind::Abuse,
            retry_after.unwrap_or(FALLBACK_RETRY_AFTER_SECS),
        ));
    }

    if headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim() == "0")
    {
        let reset = headers
            .get("x-ratelimit-reset")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or_else(|| now.timestamp());
        let wait = reset
            .saturating_sub(now.timestamp())
            .saturating_add(1)
            .max(0) as u64;
        return Some((RateLimitKind::Primary, wait));
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        if let Some(secs) = retry_after {
            return Some((RateLimitKind::Secondary, secs));
        }
    }

    None
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}
