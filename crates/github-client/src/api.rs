//! The REST operations the sweep consumes.

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::models::{CheckSuite, PullRequest, PullRequestState, WorkflowRun};

/// GitHub operations needed to find and cancel workflow runs.
///
/// List operations return every page; implementations own pagination and
/// rate-limit handling.
#[async_trait]
pub trait ActionsApi: Send + Sync {
    /// `GET /repos/{owner}/{repo}/pulls?state=…&base=…`
    async fn list_pull_requests(
        &self,
        owner: &str,
        repo: &str,
        state: PullRequestState,
        base: &str,
    ) -> ApiResult<Vec<PullRequest>>;

    /// `GET /repos/{owner}/{repo}/commits/{ref}/check-suites`
    async fn list_check_suites_for_ref(
        &self,
        owner: &str,
        repo: &str,
        git_ref: &str,
    ) -> ApiResult<Vec<CheckSuite>>;

    /// `GET /repos/{owner}/{repo}/actions/runs?check_suite_id=…`
    async fn list_workflow_runs(
        &self,
        owner: &str,
        repo: &str,
        check_suite_id: u64,
    ) -> ApiResult<Vec<WorkflowRun>>;

    /// `POST /repos/{owner}/{repo}/actions/runs/{run_id}/cancel`
    async fn cancel_workflow_run(&self, owner: &str, repo: &str, run_id: u64) -> ApiResult<()>;
}
