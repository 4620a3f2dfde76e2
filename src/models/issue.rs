// Story fields mapped from a Jira issue

use serde::{Deserialize, Serialize};

/// Story fields derived from an issue, shaped like a `StoryRequest`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueFields {
    pub story_title: String,
    pub description: String,
    pub acceptance_criteria: String,
    /// No tracker field maps here, always empty
    pub additional_info: String,
}

/// Candidate issue surfaced by the project search fallback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackIssue {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}
