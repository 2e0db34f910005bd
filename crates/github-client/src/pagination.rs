//! `Link` header pagination.

use reqwest::header::{HeaderMap, LINK};
use serde::de::DeserializeOwned;

use crate::models::{CheckSuitesPage, WorkflowRunsPage};

/// Page size requested on every list call (GitHub's maximum).
pub const PER_PAGE: u32 = 100;

/// Extract the `rel="next"` URL from a `Link` header, if any.
#[must_use]
pub fn next_page_url(headers: &HeaderMap) -> Option<String> {
    let link = headers.get(LINK)?.to_str().ok()?;

    link.split(',').find_map(|part| {
        let mut segments = part.split(';');
        let target = segments.next()?.trim();
        let is_next = segments.any(|param| {
            let param = param.trim();
            param == r#"rel="next""# || param == "rel=next"
        });
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(str::to_string)
    })
}

/// A deserialized page of a list endpoint.
///
/// Most endpoints return a bare JSON array; a few wrap it in an object next to
/// a count. Both shapes flatten to their items.
pub trait Page: DeserializeOwned {
    /// Item type carried by the page.
    type Item;

    /// Consume the page and return its items.
    fn into_items(self) -> Vec<Self::Item>;
}

impl<T: DeserializeOwned> Page for Vec<T> {
    type Item = T;

    fn into_items(self) -> Vec<T> {
        self
    }
}

impl Page for CheckSuitesPage {
    type Item = crate::models::CheckSuiteRecord;

    fn into_items(self) -> Vec<Self::Item> {
        self.check_suites
    }
}

impl Page for WorkflowRunsPage {
    type Item = crate::models::WorkflowRunRecord;

    fn into_items(self) -> Vec<Self::Item> {
        self.workflow_runs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn with_link(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(LINK, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_next_link_found_among_others() {
        let headers = with_link(
            r#"<https://api.github.com/repositories/1/pulls?page=2>; rel="next", <https://api.github.com/repositories/1/pulls?page=5>; rel="last""#,
        );
        assert_eq!(
            next_page_url(&headers).as_deref(),
            Some("https://api.github.com/repositories/1/pulls?page=2")
        );
    }

    #[test]
    fn test_last_page_has_no_next() {
        let headers = with_link(
            r#"<https://api.github.com/x?page=1>; rel="first", <https://api.github.com/x?page=4>; rel="prev""#,
        );
        assert_eq!(next_page_url(&headers), None);
        assert_eq!(next_page_url(&HeaderMap::new()), None);
    }

    #[test]
    fn test_wrapped_pages_flatten() {
        let page: WorkflowRunsPage = serde_json::from_str(
            r#"{"total_count":2,"workflow_runs":[{"id":1,"conclusion":null},{"id":2,"conclusion":"success"}]}"#,
        )
        .unwrap();
        let items = page.into_items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].conclusion.as_deref(), Some("success"));
    }
}
