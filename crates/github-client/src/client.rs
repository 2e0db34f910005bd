//! GitHub REST client.
//!
//! API Documentation: <https://docs.github.com/en/rest>

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Method, Response};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::api::ActionsApi;
use crate::auth::{AuthMethod, Credentials};
use crate::error::{ApiError, ApiResult};
use crate::models::{
    CheckSuite, CheckSuitesPage, ErrorRecord, PullRequest, PullRequestRecord, PullRequestState,
    WorkflowRun, WorkflowRunsPage,
};
use crate::pagination::{next_page_url, Page, PER_PAGE};
use crate::rate_limit::{self, ThrottlePolicy, ThrottleState};
use crate::retry::{self, RetryConfig};

/// Public GitHub API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// REST API version pinned in every request.
const API_VERSION: &str = "2022-11-28";

/// Default timeout for a single HTTP request.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings for [`GitHubClient::new`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Credentials to authenticate with.
    pub auth: AuthMethod,
    /// API base URL; `None` means [`DEFAULT_API_URL`].
    pub api_url: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// What to do on rate-limit responses.
    pub throttle: ThrottlePolicy,
    /// What to do on transient failures.
    pub retry: RetryConfig,
}

impl ClientConfig {
    /// Defaults for everything except credentials.
    #[must_use]
    pub fn new(auth: AuthMethod) -> Self {
        Self {
            auth,
            api_url: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            throttle: ThrottlePolicy::default(),
            retry: RetryConfig::default(),
        }
    }

    /// Point the client at a different API host (GitHub Enterprise, tests).
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    /// Replace the transient retry configuration.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

/// Authenticated GitHub REST client.
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
    throttle: ThrottlePolicy,
    retry: RetryConfig,
}

impl fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubClient")
            .field("base_url", &self.base_url)
            .field("throttle", &self.throttle)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl GitHubClient {
    /// Build a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not http(s), the credentials are
    /// unusable, or the HTTP client cannot be created.
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        let base_url = normalize_base_url(config.api_url.as_deref())?;
        let auth_kind = config.auth.kind();
        let credentials = Credentials::new(config.auth)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("github-client/", env!("CARGO_PKG_VERSION"))),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        debug!(base_url = %base_url, auth = auth_kind, "GitHub client created");

        Ok(Self {
            http,
            base_url,
            credentials,
            throttle: config.throttle,
            retry: config.retry,
        })
    }

    /// Send one request, applying the throttle policy and transient retries.
    async fn send(
        &self,
        method: Method,
        url: &str,
        query: &[(&'static str, String)],
    ) -> ApiResult<Response> {
        let mut throttle_state = ThrottleState::default();
        let mut transient_retries = 0;

        loop {
            let authorization = self
                .credentials
                .authorization(&self.http, &self.base_url)
                .await?;

            debug!(method = %method, url = %url, "GitHub request");

            let result = self
                .http
                .request(method.clone(), url)
                .header(AUTHORIZATION, authorization)
                .query(query)
                .send()
                .await;

            let response = match result {
                Ok(response) => response,
                Err(e) if retry::is_retryable_error(&e) && self.retry.allows(transient_retries) => {
                    let delay = self.retry.delay_for(transient_retries);
                    warn!(
                        method = %method,
                        url = %url,
                        error = %e,
                        "Request failed, retrying in {delay:?}"
                    );
                    transient_retries += 1;
                    sleep(delay).await;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let status = response.status();
            if status.is_success() {
                debug!(method = %method, url = %url, status = %status, "GitHub response");
                return Ok(response);
            }

            let headers = response.headers().clone();
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body, status);

            if let Some((kind, retry_after_secs)) =
                rate_limit::classify(status, &headers, &message, Utc::now())
            {
                let event = throttle_state.event(kind, retry_after_secs);
                warn!(
                    kind = %kind,
                    attempt = event.attempt_count,
                    "Rate limit hit for request {method} {url}"
                );

                if self.throttle.should_retry(&event) {
                    info!("Retrying after {retry_after_secs} seconds!");
                    throttle_state.record_retry(kind);
                    sleep(Duration::from_secs(retry_after_secs)).await;
                    continue;
                }

                return Err(ApiError::RateLimited {
                    kind,
                    method: method.to_string(),
                    url: url.to_string(),
                    retry_after_secs,
                });
            }

            if retry::is_retryable_status(status) && self.retry.allows(transient_retries) {
                let delay = self.retry.delay_for(transient_retries);
                warn!(
                    method = %method,
                    url = %url,
                    status = %status,
                    "Server error, retrying in {delay:?}"
                );
                transient_retries += 1;
                sleep(delay).await;
                continue;
            }

            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }
    }

    /// GET every page of a list endpoint.
    async fn paginate<P: Page>(
        &self,
        path: &str,
        mut query: Vec<(&'static str, String)>,
    ) -> ApiResult<Vec<P::Item>> {
        let mut url = format!("{}{path}", self.base_url);
        query.push(("per_page", PER_PAGE.to_string()));

        let mut items = Vec::new();
        let mut pages = 0_u32;

        loop {
            let response = self.send(Method::GET, &url, &query).await?;
            let next = next_page_url(response.headers());
            let body = response.text().await?;
            let page: P = serde_json::from_str(&body)?;
            items.extend(page.into_items());
            pages += 1;

            match next {
                Some(next_url) => {
                    // The next link already carries every query parameter.
                    url = next_url;
                    query.clear();
                }
                None => break,
            }
        }

        debug!(path = %path, pages, items = items.len(), "Pagination complete");
        Ok(items)
    }
}

#[async_trait]
impl ActionsApi for GitHubClient {
    async fn list_pull_requests(
        &self,
        owner: &str,
        repo: &str,
        state: PullRequestState,
        base: &str,
    ) -> ApiResult<Vec<PullRequest>> {
        let records = self
            .paginate::<Vec<PullRequestRecord>>(
                &format!("/repos/{owner}/{repo}/pulls"),
                vec![
                    ("state", state.as_str().to_string()),
                    ("base", base.to_string()),
                ],
            )
            .await?;
        Ok(records.into_iter().map(PullRequest::from).collect())
    }

    async fn list_check_suites_for_ref(
        &self,
        owner: &str,
        repo: &str,
        git_ref: &str,
    ) -> ApiResult<Vec<CheckSuite>> {
        let git_ref = urlencoding::encode(git_ref);
        let records = self
            .paginate::<CheckSuitesPage>(
                &format!("/repos/{owner}/{repo}/commits/{git_ref}/check-suites"),
                Vec::new(),
            )
            .await?;
        Ok(records.into_iter().map(CheckSuite::from).collect())
    }

    async fn list_workflow_runs(
        &self,
        owner: &str,
        repo: &str,
        check_suite_id: u64,
    ) -> ApiResult<Vec<WorkflowRun>> {
        let records = self
            .paginate::<WorkflowRunsPage>(
                &format!("/repos/{owner}/{repo}/actions/runs"),
                vec![("check_suite_id", check_suite_id.to_string())],
            )
            .await?;
        Ok(records.into_iter().map(WorkflowRun::from).collect())
    }

    async fn cancel_workflow_run(&self, owner: &str, repo: &str, run_id: u64) -> ApiResult<()> {
        let url = format!(
            "{}/repos/{owner}/{repo}/actions/runs/{run_id}/cancel",
            self.base_url
        );
        self.send(Method::POST, &url, &[]).await?;
        Ok(())
    }
}

fn normalize_base_url(api_url: Option<&str>) -> ApiResult<String> {
    let url = api_url
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .unwrap_or(DEFAULT_API_URL)
        .trim_end_matches('/');

    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(ApiError::Config(format!(
            "API URL must start with http:// or https://, got {url:?}"
        )));
    }
    Ok(url.to_string())
}

fn error_message(body: &str, status: reqwest::StatusCode) -> String {
    if let Ok(record) = serde_json::from_str::<ErrorRecord>(body) {
        return record.message;
    }
    if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        body.to_string()
    }
}
