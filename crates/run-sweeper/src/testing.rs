//! In-memory [`ActionsApi`] for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use github_client::{
    ActionsApi, ApiError, ApiResult, CheckSuite, PullRequest, PullRequestState, WorkflowRun,
};

/// One call made against [`FakeApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListPullRequests { state: PullRequestState, base: String },
    ListCheckSuites { git_ref: String },
    ListWorkflowRuns { check_suite_id: u64 },
    Cancel { run_id: u64 },
}

/// Canned responses keyed by ref, suite or run. Failures are rebuilt on
/// every call so the same key can fail repeatedly.
#[derive(Default)]
pub struct FakeApi {
    pull_requests: Vec<PullRequest>,
    pull_request_failure: Option<(u16, String)>,
    check_suites: HashMap<String, Vec<CheckSuite>>,
    check_suite_failures: HashMap<String, (u16, String)>,
    runs: HashMap<u64, Vec<WorkflowRun>>,
    run_failures: HashMap<u64, (u16, String)>,
    cancel_failures: HashMap<u64, (u16, String)>,
    calls: Mutex<Vec<Call>>,
}

fn parts(error: &ApiError) -> (u16, String) {
    match error {
        ApiError::Api { status, message } => (*status, message.clone()),
        other => (0, other.to_string()),
    }
}

fn rebuild((status, message): &(u16, String)) -> ApiError {
    ApiError::Api {
        status: *status,
        message: message.clone(),
    }
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pull_requests(mut self, prs: Vec<PullRequest>) -> Self {
        self.pull_requests = prs;
        self
    }

    pub fn failing_pull_requests(mut self, error: ApiError) -> Self {
        self.pull_request_failure = Some(parts(&error));
        self
    }

    pub fn with_check_suites(mut self, git_ref: &str, suites: Vec<CheckSuite>) -> Self {
        self.check_suites.insert(git_ref.to_string(), suites);
        self
    }

    pub fn failing_check_suites(mut self, git_ref: &str, error: ApiError) -> Self {
        self.check_suite_failures
            .insert(git_ref.to_string(), parts(&error));
        self
    }

    pub fn with_runs(mut self, check_suite_id: u64, runs: Vec<WorkflowRun>) -> Self {
        self.runs.insert(check_suite_id, runs);
        self
    }

    pub fn failing_runs(mut self, check_suite_id: u64, error: ApiError) -> Self {
        self.run_failures.insert(check_suite_id, parts(&error));
        self
    }

    pub fn failing_cancel(mut self, run_id: u64, error: ApiError) -> Self {
        self.cancel_failures.insert(run_id, parts(&error));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Run IDs cancellation was requested for, failed requests included.
    pub fn cancelled(&self) -> Vec<u64> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Cancel { run_id } => Some(run_id),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ActionsApi for FakeApi {
    async fn list_pull_requests(
        &self,
        _owner: &str,
        _repo: &str,
        state: PullRequestState,
        base: &str,
    ) -> ApiResult<Vec<PullRequest>> {
        self.record(Call::ListPullRequests {
            state,
            base: base.to_string(),
        });
        match &self.pull_request_failure {
            Some(failure) => Err(rebuild(failure)),
            None => Ok(self.pull_requests.clone()),
        }
    }

    async fn list_check_suites_for_ref(
        &self,
        _owner: &str,
        _repo: &str,
        git_ref: &str,
    ) -> ApiResult<Vec<CheckSuite>> {
        self.record(Call::ListCheckSuites {
            git_ref: git_ref.to_string(),
        });
        if let Some(failure) = self.check_suite_failures.get(git_ref) {
            return Err(rebuild(failure));
        }
        Ok(self.check_suites.get(git_ref).cloned().unwrap_or_default())
    }

    async fn list_workflow_runs(
        &self,
        _owner: &str,
        _repo: &str,
        check_suite_id: u64,
    ) -> ApiResult<Vec<WorkflowRun>> {
        self.record(Call::ListWorkflowRuns { check_suite_id });
        if let Some(failure) = self.run_failures.get(&check_suite_id) {
            return Err(rebuild(failure));
        }
        Ok(self.runs.get(&check_suite_id).cloned().unwrap_or_default())
    }

    async fn cancel_workflow_run(&self, _owner: &str, _repo: &str, run_id: u64) -> ApiResult<()> {
        self.record(Call::Cancel { run_id });
        match self.cancel_failures.get(&run_id) {
            Some(failure) => Err(rebuild(failure)),
            None => Ok(()),
        }
    }
}

pub fn pr(number: u64, head_ref: &str, is_draft: bool) -> PullRequest {
    PullRequest {
        number,
        head_ref: head_ref.to_string(),
        is_draft,
        base_ref: "main".to_string(),
    }
}

pub fn suite(id: u64, app_name: Option<&str>, app_slug: Option<&str>) -> CheckSuite {
    CheckSuite {
        id,
        app_name: app_name.map(str::to_string),
        app_slug: app_slug.map(str::to_string),
    }
}

pub fn run(id: u64, conclusion: Option<&str>) -> WorkflowRun {
    WorkflowRun {
        id,
        status: Some(if conclusion.is_some() { "completed" } else { "in_progress" }.to_string()),
        conclusion: conclusion.map(str::to_string),
    }
}
