//! Read-only Jira Cloud integration
//!
//! `JiraClient` issues the raw REST calls and reports every HTTP outcome as a
//! [`TrackerReply`]. Deciding what to do with a reply (retry, search fallback,
//! give up) lives in [`resolver`]; turning an issue payload into story fields
//! lives in [`fields`].

pub mod auth_check;
pub mod fields;
pub mod resolver;

pub use auth_check::{check_auth, AuthVerdict};
pub use fields::{map_issue_fields, parse_search_results};
pub use resolver::{resolve_issue, Resolution};

use crate::config::JiraCredentials;
use regex::Regex;
use reqwest::Url;
use std::sync::OnceLock;
use thiserror::Error;

const SEARCH_MAX_RESULTS: &str = "10";
const TRANSIENT_MARKER: &str = "temporarily unavailable";

static PROJECT_KEY_PATTERN: OnceLock<Regex> = OnceLock::new();

fn get_project_key_pattern() -> &'static Regex {
    PROJECT_KEY_PATTERN.get_or_init(|| Regex::new(r"^([A-Z][A-Z0-9]+)-").unwrap())
}

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Invalid Jira base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Failed to reach Jira: {0}")]
    Transport(String),
}

/// Status and body of a completed Jira request, whatever the status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerReply {
    pub status: u16,
    pub body: String,
}

impl TrackerReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Jira search API flavour. Cloud sites that retired `/search` answer 410.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEndpoint {
    Modern,
    Legacy,
}

impl SearchEndpoint {
    fn path_segments(self) -> &'static [&'static str] {
        match self {
            SearchEndpoint::Modern => &["rest", "api", "3", "search", "jql"],
            SearchEndpoint::Legacy => &["rest", "api", "3", "search"],
        }
    }
}

/// 5xx or an outage page ("Site temporarily unavailable") on any status
pub fn is_transient(reply: &TrackerReply) -> bool {
    reply.status >= 500 || reply.body.to_lowercase().contains(TRANSIENT_MARKER)
}

/// Project key prefix of an issue key, e.g. `GOOG` for `GOOG-123`
pub fn project_key(issue_key: &str) -> Option<&str> {
    get_project_key_pattern()
        .captures(issue_key)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub fn project_search_jql(project_key: &str) -> String {
    format!("project={} ORDER BY created DESC", project_key)
}

/// Jira REST client using Basic auth (`email:api_token`)
pub struct JiraClient {
    http: reqwest::Client,
    credentials: JiraCredentials,
}

impl JiraClient {
    pub fn new(credentials: JiraCredentials, http: reqwest::Client) -> Self {
        log::info!("[jira] Configured for {}", credentials.base_url);
        Self { http, credentials }
    }

    pub fn base_url(&self) -> &str {
        &self.credentials.base_url
    }

    /// Fetch one issue with rendered fields expanded
    pub async fn get_issue(&self, issue_key: &str) -> Result<TrackerReply, TrackerError> {
        let mut url = self.endpoint(&["rest", "api", "3", "issue", issue_key])?;
        url.query_pairs_mut().append_pair("expand", "renderedFields");
        self.get(url).await
    }

    /// Most recent issues of a project
    pub async fn search_project(
        &self,
        project_key: &str,
        endpoint: SearchEndpoint,
    ) -> Result<TrackerReply, TrackerError> {
        let mut url = self.endpoint(endpoint.path_segments())?;
        url.query_pairs_mut()
            .append_pair("jql", &project_search_jql(project_key))
            .append_pair("maxResults", SEARCH_MAX_RESULTS);
        self.get(url).await
    }

    /// The authenticated user, used to verify credentials
    pub async fn myself(&self) -> Result<TrackerReply, TrackerError> {
        let url = self.endpoint(&["rest", "api", "3", "myself"])?;
        self.get(url).await
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, TrackerError> {
        let mut url = Url::parse(&self.credentials.base_url)
            .map_err(|e| TrackerError::InvalidBaseUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| TrackerError::InvalidBaseUrl(self.credentials.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<TrackerReply, TrackerError> {
        log::debug!("[jira] GET {}", url.path());

        let response = self
            .http
            .get(url)
            .basic_auth(&self.credentials.user_email, Some(&self.credentials.api_token))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| TrackerError::Transport(e.without_url().to_string()))?;

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        if !(200..300).contains(&status) {
            log::warn!("[jira] Non-OK response: status {}", status);
        }

        Ok(TrackerReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> JiraClient {
        JiraClient::new(
            JiraCredentials {
                base_url: base_url.to_string(),
                user_email: "qa@example.com".to_string(),
                api_token: "token".to_string(),
            },
            reqwest::Client::new(),
        )
    }

    #[test]
    fn test_project_key_extraction() {
        assert_eq!(project_key("GOOG-123"), Some("GOOG"));
        assert_eq!(project_key("AB2-7"), Some("AB2"));
        assert_eq!(project_key("123"), None);
        assert_eq!(project_key("goog-123"), None);
        assert_eq!(project_key("G-1"), None);
    }

    #[test]
    fn test_transient_classification() {
        assert!(is_transient(&TrackerReply::new(503, "")));
        assert!(is_transient(&TrackerReply::new(500, "boom")));
        assert!(!is_transient(&TrackerReply::new(404, "Issue does not exist")));
        assert!(is_transient(&TrackerReply::new(
            200,
            "<h1>Site Temporarily Unavailable</h1>"
        )));
        assert!(is_transient(&TrackerReply::new(
            403,
            "temporarily unavailable"
        )));
    }

    #[test]
    fn test_reply_success_range() {
        assert!(TrackerReply::new(200, "").is_success());
        assert!(TrackerReply::new(204, "").is_success());
        assert!(!TrackerReply::new(302, "").is_success());
        assert!(!TrackerReply::new(0, "").is_success());
    }

    #[test]
    fn test_jql() {
        assert_eq!(project_search_jql("ABC"), "project=ABC ORDER BY created DESC");
    }

    #[test]
    fn test_endpoint_encodes_issue_key() {
        let jira = client("https://acme.atlassian.net");
        let url = jira
            .endpoint(&["rest", "api", "3", "issue", "ABC 1/2"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://acme.atlassian.net/rest/api/3/issue/ABC%201%2F2"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let jira = client("https://example.com/jira");
        let url = jira
            .endpoint(SearchEndpoint::Legacy.path_segments())
            .unwrap();
        assert_eq!(url.as_str(), "https://example.com/jira/rest/api/3/search");
    }

    #[test]
    fn test_invalid_base_url() {
        let jira = client("not a url");
        assert!(matches!(
            jira.endpoint(&["rest"]),
            Err(TrackerError::InvalidBaseUrl(_))
        ));
    }
}
