// Jira issue payload -> story fields
//
// The payload is decoded into a small typed view first; each story field is
// then produced by an ordered list of named rules where the first match wins.

use crate::models::{FallbackIssue, IssueFields};
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::OnceLock;

static CRITERIA_FIELD_PATTERN: OnceLock<Regex> = OnceLock::new();

fn get_criteria_field_pattern() -> &'static Regex {
    CRITERIA_FIELD_PATTERN.get_or_init(|| Regex::new(r"(?i)acceptance|criteria").unwrap())
}

/// The parts of an issue payload the mapping looks at. Field order follows the payload.
#[derive(Debug, Default, Deserialize)]
pub struct JiraIssue {
    #[serde(default)]
    pub fields: Option<Map<String, Value>>,
    #[serde(default, rename = "renderedFields")]
    pub rendered_fields: Option<Map<String, Value>>,
}

impl JiraIssue {
    fn field(&self, name: &str) -> Option<&Value> {
        self.fields.as_ref().and_then(|f| f.get(name))
    }

    fn rendered(&self, name: &str) -> Option<&Value> {
        self.rendered_fields.as_ref().and_then(|f| f.get(name))
    }
}

struct FieldRule {
    name: &'static str,
    extract: fn(&JiraIssue) -> Option<String>,
}

const DESCRIPTION_RULES: &[FieldRule] = &[
    FieldRule {
        name: "rendered",
        extract: rendered_description,
    },
    FieldRule {
        name: "plain",
        extract: plain_description,
    },
    FieldRule {
        name: "document",
        extract: document_description,
    },
];

const ACCEPTANCE_CRITERIA_RULES: &[FieldRule] = &[FieldRule {
    name: "named-field",
    extract: criteria_by_field_name,
}];

fn rendered_description(issue: &JiraIssue) -> Option<String> {
    issue
        .rendered("description")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn plain_description(issue: &JiraIssue) -> Option<String> {
    issue
        .field("description")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Atlassian Document Format is passed through as JSON text
fn document_description(issue: &JiraIssue) -> Option<String> {
    let doc = issue.field("description")?.as_object()?;
    if !doc.get("content").is_some_and(is_truthy) {
        return None;
    }
    serde_json::to_string(doc).ok()
}

fn criteria_by_field_name(issue: &JiraIssue) -> Option<String> {
    let pattern = get_criteria_field_pattern();
    issue
        .fields
        .as_ref()?
        .iter()
        .filter(|(name, _)| pattern.is_match(name))
        .find_map(|(_, value)| value.as_str().map(str::to_string))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn apply_rules(issue: &JiraIssue, field: &str, rules: &[FieldRule]) -> String {
    for rule in rules {
        if let Some(value) = (rule.extract)(issue) {
            log::debug!("[jira] {} taken from rule '{}'", field, rule.name);
            return value;
        }
    }
    String::new()
}

pub fn map_issue(issue: &JiraIssue) -> IssueFields {
    IssueFields {
        story_title: issue
            .field("summary")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        description: apply_rules(issue, "description", DESCRIPTION_RULES),
        acceptance_criteria: apply_rules(issue, "acceptanceCriteria", ACCEPTANCE_CRITERIA_RULES),
        additional_info: String::new(),
    }
}

/// Map a raw issue body. A body that is not an issue object yields empty fields.
pub fn map_issue_fields(body: &str) -> IssueFields {
    match serde_json::from_str::<JiraIssue>(body) {
        Ok(issue) => map_issue(&issue),
        Err(e) => {
            log::warn!("[jira] Issue body is not a JSON object: {}", e);
            IssueFields::default()
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    issues: Option<Vec<SearchIssue>>,
}

#[derive(Debug, Deserialize)]
struct SearchIssue {
    key: String,
    #[serde(default)]
    fields: Option<SearchIssueFields>,
}

#[derive(Debug, Deserialize)]
struct SearchIssueFields {
    #[serde(default)]
    summary: Option<String>,
}

/// Candidate issues from a search body; `None` when the body cannot be decoded.
/// An empty body counts as an empty result.
pub fn parse_search_results(body: &str) -> Option<Vec<FallbackIssue>> {
    let body = if body.trim().is_empty() { "{}" } else { body };
    let response: SearchResponse = serde_json::from_str(body).ok()?;
    Some(
        response
            .issues
            .unwrap_or_default()
            .into_iter()
            .map(|issue| FallbackIssue {
                key: issue.key,
                summary: issue.fields.and_then(|f| f.summary),
            })
            .collect(),
    )
}
