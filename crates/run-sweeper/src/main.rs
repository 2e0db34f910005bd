//! run-sweeper - cancel running workflow runs of open pull requests.
//!
//! Inputs come from flags or, when run as an action step, from the
//! `INPUT_*` variables the runner sets.

use std::process::ExitCode;

use anyhow::Result;
use clap::builder::FalseyValueParser;
use clap::Parser;
use tracing::{debug, info};

use run_sweeper::{actions, connect_github, execute, logging, publish, RawInputs};

/// Cancel in-flight GitHub Actions runs of open, non-draft pull requests.
#[derive(Parser)]
#[command(name = "run-sweeper")]
#[command(about = "Cancel running workflow runs of open pull requests targeting a branch")]
#[command(version)]
struct Cli {
    /// Base branch whose pull requests are swept.
    #[arg(long, env = "INPUT_BRANCH")]
    branch: Option<String>,

    /// Repository as owner/repo (defaults to `GITHUB_REPOSITORY`).
    #[arg(long, env = "INPUT_REPOSITORY")]
    repository: Option<String>,

    /// Token used for API calls.
    #[arg(long, env = "INPUT_GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// GitHub App ID.
    #[arg(long, env = "INPUT_APP_ID")]
    app_id: Option<String>,

    /// GitHub App private key (PEM).
    #[arg(long, env = "INPUT_PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// GitHub App installation ID.
    #[arg(long, env = "INPUT_INSTALLATION_ID")]
    installation_id: Option<String>,

    /// API base URL, for GitHub Enterprise Server.
    #[arg(long, env = "INPUT_API_URL")]
    api_url: Option<String>,

    /// Log the runs that would be cancelled without cancelling them.
    #[arg(long, env = "INPUT_DRY_RUN", value_parser = FalseyValueParser::new())]
    dry_run: bool,

    /// Enable debug logging (also enabled by `RUNNER_DEBUG=1`).
    #[arg(long)]
    debug: bool,
}

impl From<Cli> for RawInputs {
    fn from(cli: Cli) -> Self {
        Self {
            branch: cli.branch,
            repository: cli.repository,
            github_token: cli.github_token,
            app_id: cli.app_id,
            private_key: cli.private_key,
            installation_id: cli.installation_id,
            api_url: cli.api_url,
            dry_run: cli.dry_run,
            debug: cli.debug,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let inputs = RawInputs::from(Cli::parse()).with_env_fallbacks();
    let debug_enabled = inputs.debug;
    logging::init(debug_enabled)?;

    match execute(inputs, connect_github).await {
        Ok(report) => {
            publish(&report)?;
            info!("Processed {} pull requests", report.processed_count());
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            actions::set_failed(&format!("Action failed: {e}"));
            if debug_enabled {
                let chain = anyhow::Error::from(e);
                debug!("{chain:?}");
            }
            Ok(ExitCode::FAILURE)
        }
    }
}
