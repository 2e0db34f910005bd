//! Error types for the GitHub client.

use thiserror::Error;

use crate::rate_limit::RateLimitKind;

/// Errors returned by [`crate::GitHubClient`] operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response was received.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// GitHub answered with a non-success status.
    #[error("GitHub API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// A rate-limit signal that the throttle policy declined to retry.
    #[error("{kind} rate limit hit for {method} {url} (retry after {retry_after_secs}s)")]
    RateLimited {
        kind: RateLimitKind,
        method: String,
        url: String,
        retry_after_secs: u64,
    },

    /// Credentials could not be turned into an authorization header.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Client configuration is unusable.
    #[error("Invalid client configuration: {0}")]
    Config(String),

    /// Response body did not match the expected shape.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status of the failed response, when there was one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result alias for client operations.
pub type ApiResult<T> = Result<T, ApiError>;
