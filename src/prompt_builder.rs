// Prompt construction for test case and mock data generation

use crate::models::{normalize_schema, MockDataFormat, StoryRequest};

/// System prompt for test case generation
pub const TEST_SYSTEM_PROMPT: &str = r#"You are a senior QA engineer with expertise in creating comprehensive test cases from user stories. Your task is to analyze user stories and generate detailed test cases.

CRITICAL: You must return ONLY valid JSON matching this exact schema:

{
  "cases": [
    {
      "id": "TC-001",
      "title": "string",
      "steps": ["string", "..."],
      "testData": "string (optional)",
      "expectedResult": "string",
      "category": "string (e.g., Positive|Negative|Edge|Authorization|Non-Functional)"
    }
  ],
  "model": "string (optional)",
  "promptTokens": 0,
  "completionTokens": 0
}

Guidelines:
- Generate test case IDs like TC-001, TC-002, etc.
- Write concise, imperative steps (e.g., "Click login button", "Enter valid email")
- Include Positive, Negative, and Edge test cases where relevant
- Categories: Positive, Negative, Edge, Authorization, Non-Functional
- Steps should be actionable and specific
- Expected results should be clear and measurable
Return ONLY the JSON object, no additional text or formatting."#;

/// Build the user prompt for test case generation
pub fn build_test_prompt(request: &StoryRequest) -> String {
    let mut prompt = format!(
        "Generate comprehensive test cases for the following user story:\n\n\
         Story Title: {}\n\n\
         Acceptance Criteria:\n{}\n",
        request.story_title, request.acceptance_criteria
    );

    if let Some(description) = non_blank(request.description.as_deref()) {
        prompt.push_str(&format!("\nDescription:\n{}\n", description));
    }

    if let Some(info) = non_blank(request.additional_info.as_deref()) {
        prompt.push_str(&format!("\nAdditional Information:\n{}\n", info));
    }

    let categories = request.category_set();
    if categories.is_empty() {
        prompt.push_str(
            "\nGenerate test cases covering positive scenarios, negative scenarios, edge cases, \
             and any authorization or non-functional requirements as applicable. \
             Return only the JSON response.",
        );
    } else {
        prompt.push_str(&format!(
            "\nGenerate test cases only for the following categories: {}. Return only the JSON response.",
            categories.join(", ")
        ));
    }

    prompt
}

/// Build the user prompt for mock data generation
pub fn build_mock_prompt(
    rows: u32,
    schema_description: &str,
    format: MockDataFormat,
    seed: Option<i64>,
) -> String {
    let mut prompt = format!(
        "Generate {} sample rows of data matching the following schema: {}.\n\
         Return the data as {} only (no explanatory text).",
        rows,
        normalize_schema(schema_description),
        format.as_str().to_uppercase()
    );
    if let Some(seed) = seed {
        prompt.push_str(&format!(" Use seed {} for deterministic output.", seed));
    }
    prompt
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
