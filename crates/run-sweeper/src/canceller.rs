use std::sync::Arc;

use github_client::{ActionsApi, WorkflowRun};
use tracing::{error, info};

use crate::error::{CancelError, FetchError, Listing};

/// What happened to one cancellation request.
#[derive(Debug)]
pub enum CancelOutcome {
    /// GitHub accepted the request.
    Requested,
    /// Dry run; nothing was sent.
    DryRun,
    /// The request failed. Already logged.
    Failed(CancelError),
}

/// Lists running workflow runs and cancels them.
#[derive(Clone)]
pub struct RunCanceller {
    api: Arc<dyn ActionsApi>,
    dry_run: bool,
}

impl RunCanceller {
    pub fn new(api: Arc<dyn ActionsApi>) -> Self {
        Self {
            api,
            dry_run: false,
        }
    }

    /// Log the runs that would be cancelled instead of cancelling them.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Runs of a check suite that have not concluded yet.
    pub async fn list_running_runs(
        &self,
        owner: &str,
        repo: &str,
        check_suite_id: u64,
    ) -> Result<Vec<WorkflowRun>, FetchError> {
        let runs = self
            .api
            .list_workflow_runs(owner, repo, check_suite_id)
            .await
            .map_err(|e| FetchError::new(Listing::WorkflowRuns, e))?;

        let running = running(runs);
        info!(
            "Found {} running workflow runs for check suite {check_suite_id}",
            running.len()
        );
        Ok(running)
    }

    /// Request cancellation of one run.
    ///
    /// Failures are logged here and reported only through the outcome; the
    /// state of the run is not re-checked afterwards.
    pub async fn cancel(&self, owner: &str, repo: &str, run_id: u64) -> CancelOutcome {
        if self.dry_run {
            info!("Dry run: would cancel workflow run {run_id}");
            return CancelOutcome::DryRun;
        }

        info!("Cancelling workflow run {run_id}");
        match self.api.cancel_workflow_run(owner, repo, run_id).await {
            Ok(()) => CancelOutcome::Requested,
            Err(source) => {
                let err = CancelError { run_id, source };
                error!("{err}");
                CancelOutcome::Failed(err)
            }
        }
    }
}

/// Keep the runs without a conclusion.
pub fn running(runs: Vec<WorkflowRun>) -> Vec<WorkflowRun> {
    runs.into_iter().filter(WorkflowRun::is_running).collect()
}
