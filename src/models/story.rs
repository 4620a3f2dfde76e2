// User story input and generated test case output

use serde::{Deserialize, Serialize};

/// Request body for test case generation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryRequest {
    pub story_title: String,
    pub acceptance_criteria: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub additional_info: Option<String>,
    /// Category labels to restrict generation to. Empty means all categories.
    #[serde(default)]
    pub categories: Vec<String>,
}

impl StoryRequest {
    /// Validate the request before a prompt is built
    pub fn validate(&self) -> Result<(), String> {
        if self.story_title.trim().is_empty() {
            return Err("storyTitle is required".to_string());
        }
        if self.acceptance_criteria.trim().is_empty() {
            return Err("acceptanceCriteria is required".to_string());
        }
        Ok(())
    }

    /// Requested categories with blanks and duplicates removed, first-seen order kept
    pub fn category_set(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for category in &self.categories {
            let category = category.trim();
            if !category.is_empty() && !seen.contains(&category) {
                seen.push(category);
            }
        }
        seen
    }
}

/// A single generated test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_data: Option<String>,
    pub expected_result: String,
    /// Positive, Negative, Edge, Authorization or Non-Functional. Not enforced.
    #[serde(default)]
    pub category: String,
}

/// Response body for test case generation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub cases: Vec<TestCase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
}

impl GenerateResponse {
    /// Fill in `TC-NNN` ids for cases the model left without one
    pub fn assign_missing_ids(&mut self) {
        for (index, case) in self.cases.iter_mut().enumerate() {
            if case.id.trim().is_empty() {
                case.id = format!("TC-{:03}", index + 1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story(title: &str, criteria: &str) -> StoryRequest {
        StoryRequest {
            story_title: title.to_string(),
            acceptance_criteria: criteria.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_requires_title_and_criteria() {
        assert!(story("Login", "User can sign in").validate().is_ok());
        assert_eq!(
            story("  ", "User can sign in").validate().unwrap_err(),
            "storyTitle is required"
        );
        assert_eq!(
            story("Login", "").validate().unwrap_err(),
            "acceptanceCriteria is required"
        );
    }

    #[test]
    fn test_deserialize_camel_case_with_optional_fields() {
        let json = r#"{"storyTitle": "Login", "acceptanceCriteria": "AC"}"#;
        let req: StoryRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.story_title, "Login");
        assert!(req.description.is_none());
        assert!(req.categories.is_empty());
    }

    #[test]
    fn test_category_set_dedupes_in_order() {
        let mut req = story("Login", "AC");
        req.categories = vec![
            "Negative".to_string(),
            "Positive".to_string(),
            "Negative".to_string(),
            " ".to_string(),
        ];
        assert_eq!(req.category_set(), vec!["Negative", "Positive"]);
    }

    #[test]
    fn test_assign_missing_ids() {
        let json = r#"{
            "cases": [
                {"id": "TC-007", "title": "a", "steps": [], "expectedResult": "x", "category": "Edge"},
                {"title": "b", "steps": ["Click"], "expectedResult": "y", "category": "Positive"}
            ],
            "promptTokens": 0,
            "completionTokens": 0
        }"#;
        let mut resp: GenerateResponse = serde_json::from_str(json).unwrap();
        resp.assign_missing_ids();
        assert_eq!(resp.cases[0].id, "TC-007");
        assert_eq!(resp.cases[1].id, "TC-002");
    }

    #[test]
    fn test_test_data_omitted_when_absent() {
        let case = TestCase {
            id: "TC-001".to_string(),
            title: "Valid login".to_string(),
            steps: vec!["Enter valid email".to_string()],
            test_data: None,
            expected_result: "Dashboard shown".to_string(),
            category: "Positive".to_string(),
        };
        let value = serde_json::to_value(&case).unwrap();
        assert!(value.get("testData").is_none());
        assert_eq!(value["expectedResult"], "Dashboard shown");
    }
}
