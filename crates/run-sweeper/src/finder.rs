use std::sync::Arc;

use github_client::{ActionsApi, PullRequest, PullRequestState};
use tracing::info;

use crate::error::{FetchError, Listing};

/// Finds open pull requests that are ready for review.
#[derive(Clone)]
pub struct PullRequestFinder {
    api: Arc<dyn ActionsApi>,
}

impl PullRequestFinder {
    pub fn new(api: Arc<dyn ActionsApi>) -> Self {
        Self { api }
    }

    /// Open, non-draft pull requests whose base branch is `base_branch`.
    ///
    /// Every page is read; an empty result is not an error.
    pub async fn list_non_draft_open_prs(
        &self,
        owner: &str,
        repo: &str,
        base_branch: &str,
    ) -> Result<Vec<PullRequest>, FetchError> {
        info!("Fetching open PRs targeting branch: {base_branch}");

        let pull_requests = self
            .api
            .list_pull_requests(owner, repo, PullRequestState::Open, base_branch)
            .await
            .map_err(|e| FetchError::new(Listing::PullRequests, e))?;

        let ready = non_draft(pull_requests);
        info!(
            "Found {} non-draft open PRs targeting branch {base_branch}",
            ready.len()
        );
        Ok(ready)
    }
}

/// Drop draft pull requests, keeping order.
pub fn non_draft(pull_requests: Vec<PullRequest>) -> Vec<PullRequest> {
    pull_requests.into_iter().filter(|pr| !pr.is_draft).collect()
}
