//! GitHub REST client for workflow-run housekeeping.
//!
//! Wraps the handful of endpoints needed to find pull requests, their
//! GitHub Actions check suites and workflow runs, and to cancel runs.
//!
//! # Usage
//!
//! ```no_run
//! use github_client::{ActionsApi, AuthMethod, ClientConfig, GitHubClient, PullRequestState};
//!
//! # async fn example() -> Result<(), github_client::ApiError> {
//! let client = GitHubClient::new(ClientConfig::new(AuthMethod::Token("ghp_...".into())))?;
//! let prs = client
//!     .list_pull_requests("5dlabs", "cto", PullRequestState::Open, "main")
//!     .await?;
//! println!("{} open pull requests", prs.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Behaviour
//!
//! - List calls follow `Link: rel="next"` until the last page.
//! - Rate-limit responses go through [`ThrottlePolicy`]: primary limits
//!   are retried once, secondary limits never, abuse detection always.
//! - 5xx responses and dropped connections are retried per [`RetryConfig`].
//! - [`AuthMethod::App`] mints a JWT and exchanges it for a cached
//!   installation token.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod pagination;
pub mod rate_limit;
pub mod retry;

pub use api::ActionsApi;
pub use auth::AuthMethod;
pub use client::{ClientConfig, GitHubClient, DEFAULT_API_URL};
pub use error::{ApiError, ApiResult};
pub use models::{CheckSuite, PullRequest, PullRequestState, WorkflowRun};
pub use rate_limit::{RateLimitEvent, RateLimitKind, ThrottlePolicy};
pub use retry::RetryConfig;
