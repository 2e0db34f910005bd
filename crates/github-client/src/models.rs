//! Request and response models.
//!
//! The `*Record` types mirror the JSON GitHub sends; the plain types are
//! the trimmed snapshots the rest of the workspace works with.

use serde::Deserialize;

// ============================================================================
// Domain snapshots
// ============================================================================

/// An open pull request as seen at sweep time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    /// Pull request number.
    pub number: u64,
    /// Branch the pull request comes from.
    pub head_ref: String,
    /// Whether the pull request is a draft.
    pub is_draft: bool,
    /// Branch the pull request targets.
    pub base_ref: String,
}

/// A check suite run by one GitHub App against a ref.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckSuite {
    /// Check suite ID.
    pub id: u64,
    /// Display name of the owning app, if GitHub reported one.
    pub app_name: Option<String>,
    /// Slug of the owning app, if GitHub reported one.
    pub app_slug: Option<String>,
}

/// A workflow run belonging to a check suite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowRun {
    /// Workflow run ID.
    pub id: u64,
    /// `queued`, `in_progress`, `completed`, ...
    pub status: Option<String>,
    /// `None` while the run has not finished.
    pub conclusion: Option<String>,
}

impl WorkflowRun {
    /// A run is still running until GitHub reports a conclusion.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.conclusion.is_none()
    }
}

/// `state` filter for the pull request list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PullRequestState {
    #[default]
    Open,
}

impl PullRequestState {
    /// Query-string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
        }
    }
}

// ============================================================================
// Wire types
// ============================================================================

/// Pull request from `GET /repos/{owner}/{repo}/pulls`.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestRecord {
    pub number: u64,
    #[serde(default)]
    pub draft: Option<bool>,
    pub head: GitRefRecord,
    pub base: GitRefRecord,
}

/// `head` / `base` object of a pull request.
#[derive(Debug, Clone, Deserialize)]
pub struct GitRefRecord {
    #[serde(rename = "ref")]
    pub ref_name: String,
}

impl From<PullRequestRecord> for PullRequest {
    fn from(record: PullRequestRecord) -> Self {
        Self {
            number: record.number,
            head_ref: record.head.ref_name,
            is_draft: record.draft.unwrap_or(false),
            base_ref: record.base.ref_name,
        }
    }
}

/// Body of `GET /repos/{owner}/{repo}/commits/{ref}/check-suites`.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckSuitesPage {
    #[serde(default)]
    pub check_suites: Vec<CheckSuiteRecord>,
}

/// Check suite entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckSuiteRecord {
    pub id: u64,
    #[serde(default)]
    pub app: Option<AppRecord>,
}

/// GitHub App that owns a check suite.
#[derive(Debug, Clone, Deserialize)]
pub struct AppRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

impl From<CheckSuiteRecord> for CheckSuite {
    fn from(record: CheckSuiteRecord) -> Self {
        let (app_name, app_slug) = record
            .app
            .map(|app| (app.name, app.slug))
            .unwrap_or_default();
        Self {
            id: record.id,
            app_name,
            app_slug,
        }
    }
}

/// Body of `GET /repos/{owner}/{repo}/actions/runs`.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowRunsPage {
    #[serde(default)]
    pub workflow_runs: Vec<WorkflowRunRecord>,
}

/// Workflow run entry.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowRunRecord {
    pub id: u64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub conclusion: Option<String>,
}

impl From<WorkflowRunRecord> for WorkflowRun {
    fn from(record: WorkflowRunRecord) -> Self {
        Self {
            id: record.id,
            status: record.status,
            conclusion: record.conclusion,
        }
    }
}

/// Body of `POST /app/installations/{id}/access_tokens`.
#[derive(Debug, Clone, Deserialize)]
pub struct InstallationTokenRecord {
    pub token: String,
    pub expires_at: String,
}

/// Error body GitHub attaches to most failures.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorRecord {
    pub message: String,
}
