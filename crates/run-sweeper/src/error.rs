//! Error taxonomy for a sweep.
//!
//! Failures get more forgiving the deeper they happen: configuration and
//! pull-request discovery abort the sweep, check-suite and workflow-run
//! discovery are isolated to one PR or suite, and cancellation failures are
//! logged and absorbed where they occur.

use std::fmt;

use github_client::ApiError;
use thiserror::Error;

/// Invalid or missing configuration. Collects every problem found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Configuration errors:\n{}", .problems.join("\n"))]
pub struct ConfigError {
    pub problems: Vec<String>,
}

/// Which list call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    PullRequests,
    CheckSuites,
    WorkflowRuns,
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PullRequests => "pull requests",
            Self::CheckSuites => "check suites",
            Self::WorkflowRuns => "workflow runs",
        })
    }
}

/// A list call against GitHub failed.
#[derive(Debug, Error)]
#[error("Failed to fetch {listing}: {source}")]
pub struct FetchError {
    pub listing: Listing,
    #[source]
    pub source: ApiError,
}

impl FetchError {
    pub(crate) fn new(listing: Listing, source: ApiError) -> Self {
        Self { listing, source }
    }
}

/// A single cancellation request failed. Never propagated past the run.
#[derive(Debug, Error)]
#[error("Failed to cancel workflow run {run_id}: {source}")]
pub struct CancelError {
    pub run_id: u64,
    #[source]
    pub source: ApiError,
}

/// Failures that abort a whole sweep.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to create GitHub client: {0}")]
    Client(#[source] ApiError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}
