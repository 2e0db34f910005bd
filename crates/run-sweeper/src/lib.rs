//! Cancel in-flight GitHub Actions workflow runs of open pull requests.
//!
//! Given a base branch, the sweep lists the open non-draft pull requests
//! targeting it, resolves the GitHub Actions check suites of each PR's head
//! ref, and requests cancellation of every workflow run in those suites
//! that has not concluded yet.
//!
//! ```no_run
//! use run_sweeper::{config::RawInputs, connect_github, execute};
//!
//! # async fn example() -> Result<(), run_sweeper::error::SweepError> {
//! let inputs = RawInputs {
//!     branch: Some("main".into()),
//!     repository: Some("acme/widgets".into()),
//!     github_token: Some("ghp_...".into()),
//!     ..RawInputs::default()
//! };
//! let report = execute(inputs, connect_github).await?;
//! println!("{} pull requests processed", report.processed_count());
//! # Ok(())
//! # }
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod actions;
pub mod canceller;
pub mod config;
pub mod error;
pub mod finder;
pub mod logging;
pub mod orchestrator;
pub mod resolver;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use github_client::{ActionsApi, ApiError, ClientConfig, GitHubClient};
use tracing::{debug, info};

pub use canceller::{CancelOutcome, RunCanceller};
pub use config::{Config, RawInputs};
pub use error::{CancelError, ConfigError, FetchError, SweepError};
pub use finder::PullRequestFinder;
pub use orchestrator::{Orchestrator, SweepReport};
pub use resolver::{CheckSuiteResolver, CiProvider};

/// Step output holding the number of pull requests considered.
pub const OUTPUT_PRS_PROCESSED: &str = "prs_processed";

/// Validate `inputs`, build a client with `connect`, and sweep.
///
/// `connect` is only called once the configuration is valid.
pub async fn execute<F>(inputs: RawInputs, connect: F) -> Result<SweepReport, SweepError>
where
    F: FnOnce(ClientConfig) -> Result<Arc<dyn ActionsApi>, ApiError>,
{
    let config = Config::from_inputs(inputs)?;
    debug!(
        repository = %config.repository(),
        branch = %config.branch,
        auth = config.auth.kind(),
        dry_run = config.dry_run,
        "Configuration loaded successfully"
    );

    let api = connect(config.client_config()).map_err(SweepError::Client)?;
    debug!("GitHub client created successfully");

    if config.dry_run {
        info!("Dry run enabled, no workflow runs will be cancelled");
    }

    let report = Orchestrator::new(api)
        .with_dry_run(config.dry_run)
        .run(&config.owner, &config.repo, &config.branch)
        .await?;
    Ok(report)
}

/// Client factory backed by the GitHub REST API.
pub fn connect_github(config: ClientConfig) -> Result<Arc<dyn ActionsApi>, ApiError> {
    Ok(Arc::new(GitHubClient::new(config)?))
}

/// Publish the sweep result as step outputs.
pub fn publish(report: &SweepReport) -> std::io::Result<()> {
    actions::set_output(OUTPUT_PRS_PROCESSED, &report.processed_count().to_string())
}
