use std::sync::Arc;

use github_client::{ActionsApi, CheckSuite};
use tracing::{debug, info};

use crate::error::{FetchError, Listing};

/// The GitHub App that owns a CI provider's check suites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CiProvider {
    pub name: &'static str,
    pub slug: &'static str,
}

impl CiProvider {
    pub const GITHUB_ACTIONS: Self = Self {
        name: "GitHub Actions",
        slug: "github-actions",
    };

    /// True when either the app name or the app slug matches exactly.
    /// Matching on either keeps working across app renames.
    pub fn owns(&self, suite: &CheckSuite) -> bool {
        suite.app_name.as_deref() == Some(self.name) || suite.app_slug.as_deref() == Some(self.slug)
    }
}

/// Resolves the check suites a CI provider ran against a ref.
#[derive(Clone)]
pub struct CheckSuiteResolver {
    api: Arc<dyn ActionsApi>,
    provider: CiProvider,
}

impl CheckSuiteResolver {
    /// Resolver for GitHub Actions suites.
    pub fn new(api: Arc<dyn ActionsApi>) -> Self {
        Self::for_provider(api, CiProvider::GITHUB_ACTIONS)
    }

    pub fn for_provider(api: Arc<dyn ActionsApi>, provider: CiProvider) -> Self {
        Self { api, provider }
    }

    pub async fn list_actions_check_suites(
        &self,
        owner: &str,
        repo: &str,
        git_ref: &str,
    ) -> Result<Vec<CheckSuite>, FetchError> {
        debug!("Fetching check suites for ref: {git_ref}");

        let suites = self
            .api
            .list_check_suites_for_ref(owner, repo, git_ref)
            .await
            .map_err(|e| FetchError::new(Listing::CheckSuites, e))?;

        let owned = owned_by(self.provider, suites);
        info!(
            "Found {} {} check suites for ref {git_ref}",
            owned.len(),
            self.provider.name
        );
        Ok(owned)
    }
}

/// Keep the suites `provider` owns.
pub fn owned_by(provider: CiProvider, suites: Vec<CheckSuite>) -> Vec<CheckSuite> {
    suites.into_iter().filter(|s| provider.owns(s)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{suite, Call, FakeApi};
    use github_client::ApiError;

    #[test]
    fn test_owns_matches_name_or_slug() {
        let provider = CiProvider::GITHUB_ACTIONS;
        assert!(provider.owns(&suite(1, Some("GitHub Actions"), Some("github-actions"))));
        assert!(provider.owns(&suite(2, Some("GitHub Actions"), Some("renamed"))));
        assert!(provider.owns(&suite(3, Some("Renamed"), Some("github-actions"))));
        assert!(!provider.owns(&suite(4, Some("CircleCI"), Some("circleci-checks"))));
        assert!(!provider.owns(&suite(5, None, None)));
    }

    #[test]
    fn test_owns_is_case_sensitive() {
        let provider = CiProvider::GITHUB_ACTIONS;
        assert!(!provider.owns(&suite(1, Some("github actions"), Some("GitHub-Actions"))));
    }

    #[test]
    fn test_owned_by_keeps_order() {
        let suites = vec![
            suite(1, Some("GitHub Actions"), None),
            suite(2, Some("Travis CI"), Some("travis-ci")),
            suite(3, None, Some("github-actions")),
        ];
        let kept = owned_by(CiProvider::GITHUB_ACTIONS, suites);
        assert_eq!(kept.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[tokio::test]
    async fn test_resolves_suites_for_ref() {
        let api = Arc::new(FakeApi::new().with_check_suites(
            "feat-1",
            vec![
                suite(10, Some("GitHub Actions"), Some("github-actions")),
                suite(11, Some("Codecov"), Some("codecov")),
            ],
        ));
        let resolver = CheckSuiteResolver::new(api.clone());

        let suites = resolver
            .list_actions_check_suites("acme", "widgets", "feat-1")
            .await
            .unwrap();

        assert_eq!(suites.len(), 1);
        assert_eq!(suites[0].id, 10);
        assert_eq!(
            api.calls(),
            vec![Call::ListCheckSuites {
                git_ref: "feat-1".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_unknown_ref_has_no_suites() {
        let resolver = CheckSuiteResolver::new(Arc::new(FakeApi::new()));
        let suites = resolver
            .list_actions_check_suites("acme", "widgets", "nothing-here")
            .await
            .unwrap();
        assert!(suites.is_empty());
    }

    #[tokio::test]
    async fn test_custom_provider() {
        let provider = CiProvider {
            name: "Buildkite",
            slug: "buildkite",
        };
        let api = Arc::new(FakeApi::new().with_check_suites(
            "feat-1",
            vec![
                suite(10, Some("GitHub Actions"), Some("github-actions")),
                suite(11, Some("Buildkite"), Some("buildkite")),
            ],
        ));
        let resolver = CheckSuiteResolver::for_provider(api, provider);

        let suites = resolver
            .list_actions_check_suites("acme", "widgets", "feat-1")
            .await
            .unwrap();
        assert_eq!(suites.iter().map(|s| s.id).collect::<Vec<_>>(), vec![11]);
    }

    #[tokio::test]
    async fn test_listing_failure_becomes_fetch_error() {
        let api = Arc::new(FakeApi::new().failing_check_suites(
            "feat-1",
            ApiError::Api {
                status: 422,
                message: "No commit found for SHA: feat-1".to_string(),
            },
        ));
        let resolver = CheckSuiteResolver::new(api);

        let err = resolver
            .list_actions_check_suites("acme", "widgets", "feat-1")
            .await
            .unwrap_err();
        assert_eq!(err.listing, Listing::CheckSuites);
    }
}
