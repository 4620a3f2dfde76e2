// POST /api/generate-tests

use crate::models::{GenerateResponse, StoryRequest, TestCase};
use crate::prompt_builder::{build_test_prompt, TEST_SYSTEM_PROMPT};
use crate::server::error::ApiError;
use crate::server::ServerAppState;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;

/// Shape the model is asked to return
#[derive(Debug, Deserialize)]
struct GeneratedCases {
    cases: Vec<TestCase>,
}

pub async fn generate_tests_handler(
    State(state): State<ServerAppState>,
    payload: Result<Json<StoryRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(request) = payload?;
    request.validate().map_err(ApiError::Validation)?;

    log::info!(
        "[generate] Generating test cases for '{}' ({} categories)",
        request.story_title,
        request.category_set().len()
    );

    let user_prompt = build_test_prompt(&request);
    let completion = state
        .llm
        .generate_structured(TEST_SYSTEM_PROMPT, &user_prompt)
        .await?;

    let generated: GeneratedCases = serde_json::from_value(completion.value).map_err(|e| {
        log::error!("[generate] LLM response does not match the test case schema: {}", e);
        ApiError::LlmCallFailed
    })?;

    let mut response = GenerateResponse {
        cases: generated.cases,
        model: completion.model,
        prompt_tokens: completion.prompt_tokens,
        completion_tokens: completion.completion_tokens,
    };
    response.assign_missing_ids();

    log::info!("[generate] Generated {} test cases", response.cases.len());
    Ok(Json(response))
}
