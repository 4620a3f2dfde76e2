// POST /api/mockdata

use crate::mock_data::{generate_local_sample, reformat_llm_output, render_sample};
use crate::models::{MockDataFormat, MockDataRequest, MockDataResponse};
use crate::prompt_builder::build_mock_prompt;
use crate::server::error::ApiError;
use crate::server::ServerAppState;
use axum::{extract::rejection::JsonRejection, extract::State, Json};

fn local_response(request: &MockDataRequest) -> MockDataResponse {
    let records = generate_local_sample(request.rows, &request.schema_description);
    MockDataResponse::data(render_sample(&records, request.format), request.format)
}

pub async fn mock_data_handler(
    State(state): State<ServerAppState>,
    payload: Result<Json<MockDataRequest>, JsonRejection>,
) -> Result<Json<MockDataResponse>, ApiError> {
    let Json(request) = payload?;
    request.validate().map_err(ApiError::Validation)?;

    let format: MockDataFormat = request.format;
    let prompt = build_mock_prompt(
        request.rows,
        &request.schema_description,
        format,
        request.seed,
    );

    if request.preview_only {
        return Ok(Json(MockDataResponse::preview(prompt, format)));
    }

    if !state.llm.has_api_key() {
        log::info!(
            "[mockdata] No LLM API key; generating {} rows locally",
            request.rows
        );
        return Ok(Json(local_response(&request)));
    }

    match state.llm.generate_raw("", &prompt).await {
        Ok(raw) => Ok(Json(MockDataResponse::data(
            reformat_llm_output(raw, format),
            format,
        ))),
        Err(e) => {
            log::warn!("[mockdata] LLM generation failed, using local generator: {}", e);
            Ok(Json(local_response(&request)))
        }
    }
}
