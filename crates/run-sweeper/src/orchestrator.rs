//! Per-branch sweep.
//!
//! Pull requests, their check suites and each suite's runs are handled one
//! at a time. A failure while handling one PR or one suite is logged and the
//! sweep moves on to the next; only the initial PR listing can abort it.

use std::sync::Arc;

use github_client::{ActionsApi, CheckSuite, PullRequest};
use tracing::{debug, error, info};

use crate::canceller::{CancelOutcome, RunCanceller};
use crate::error::FetchError;
use crate::finder::PullRequestFinder;
use crate::resolver::CheckSuiteResolver;

/// Tally of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Non-draft open PRs found for the branch.
    pub prs_processed: usize,
    pub suites_inspected: usize,
    pub runs_cancelled: usize,
    pub runs_skipped_dry_run: usize,
    pub cancel_failures: usize,
    /// PRs whose check suites could not be listed.
    pub pr_failures: usize,
    /// Suites whose workflow runs could not be listed.
    pub suite_failures: usize,
}

impl SweepReport {
    /// The number reported as the step output: PRs considered, whether or
    /// not anything was cancelled for them.
    pub fn processed_count(&self) -> usize {
        self.prs_processed
    }
}

/// Runs the find, resolve and cancel pipeline for a branch.
#[derive(Clone)]
pub struct Orchestrator {
    finder: PullRequestFinder,
    resolver: CheckSuiteResolver,
    canceller: RunCanceller,
}

impl Orchestrator {
    pub fn new(api: Arc<dyn ActionsApi>) -> Self {
        Self {
            finder: PullRequestFinder::new(Arc::clone(&api)),
            resolver: CheckSuiteResolver::new(Arc::clone(&api)),
            canceller: RunCanceller::new(api),
        }
    }

    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.canceller = self.canceller.with_dry_run(dry_run);
        self
    }

    /// Sweep `base_branch`.
    ///
    /// # Errors
    ///
    /// Fails only when the pull request listing fails.
    pub async fn run(
        &self,
        owner: &str,
        repo: &str,
        base_branch: &str,
    ) -> Result<SweepReport, FetchError> {
        let prs = self
            .finder
            .list_non_draft_open_prs(owner, repo, base_branch)
            .await?;

        let mut report = SweepReport {
            prs_processed: prs.len(),
            ..SweepReport::default()
        };

        for pr in &prs {
            if let Err(e) = self.process_pr(owner, repo, pr, &mut report).await {
                error!("Error processing PR ref {}: {e}", pr.head_ref);
                report.pr_failures += 1;
            }
        }

        info!(
            prs = report.prs_processed,
            suites = report.suites_inspected,
            cancelled = report.runs_cancelled,
            dry_run = report.runs_skipped_dry_run,
            cancel_failures = report.cancel_failures,
            pr_failures = report.pr_failures,
            suite_failures = report.suite_failures,
            "Sweep of branch {base_branch} complete"
        );
        Ok(report)
    }

    // Suites are looked up by head ref, so PRs sharing a head ref see the
    // same suites.
    async fn process_pr(
        &self,
        owner: &str,
        repo: &str,
        pr: &PullRequest,
        report: &mut SweepReport,
    ) -> Result<(), FetchError> {
        info!("Processing PR with head ref: {}", pr.head_ref);

        let suites = self
            .resolver
            .list_actions_check_suites(owner, repo, &pr.head_ref)
            .await?;

        for suite in &suites {
            report.suites_inspected += 1;
            if let Err(e) = self.process_suite(owner, repo, suite, pr, report).await {
                error!("Error processing check suite {}: {e}", suite.id);
                report.suite_failures += 1;
            }
        }
        Ok(())
    }

    async fn process_suite(
        &self,
        owner: &str,
        repo: &str,
        suite: &CheckSuite,
        pr: &PullRequest,
        report: &mut SweepReport,
    ) -> Result<(), FetchError> {
        debug!(pr = pr.number, check_suite = suite.id, "Inspecting check suite");

        let runs = self
            .canceller
            .list_running_runs(owner, repo, suite.id)
            .await?;

        for run in &runs {
            match self.canceller.cancel(owner, repo, run.id).await {
                CancelOutcome::Requested => report.runs_cancelled += 1,
                CancelOutcome::DryRun => report.runs_skipped_dry_run += 1,
                CancelOutcome::Failed(_) => report.cancel_failures += 1,
            }
        }
        Ok(())
    }
}
