// API tests for health, test generation and mock data routes

mod common;

use axum::http::StatusCode;
use common::{app, completion, get_json, get_text, post_json, post_raw, spawn_llm};
use serde_json::{json, Value};
use std::sync::atomic::Ordering;

// =============================================================================
// Health / version / index
// =============================================================================

#[tokio::test]
async fn test_health_and_version() {
    let (status, body) = get_text(app(None, None, None), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");

    let (status, body) = get_json(app(None, None, None), "/api/version").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_index_lists_endpoints() {
    let (status, body) = get_text(app(None, None, None), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("/api/generate-tests"));
    assert!(body.contains("/api/mockdata"));
}

// =============================================================================
// POST /api/generate-tests
// =============================================================================

fn story() -> Value {
    json!({
        "storyTitle": "User login",
        "acceptanceCriteria": "Given valid credentials the user is signed in",
        "categories": ["Positive", "Negative"]
    })
}

#[tokio::test]
async fn test_generate_tests_success() {
    let content = json!({
        "cases": [
            {
                "title": "Valid login",
                "steps": ["Open login page", "Submit valid credentials"],
                "expectedResult": "User is signed in",
                "category": "Positive"
            },
            {
                "id": "TC-CUSTOM",
                "title": "Wrong password",
                "steps": ["Submit wrong password"],
                "testData": "password=nope",
                "expectedResult": "Error shown",
                "category": "Negative"
            }
        ]
    })
    .to_string();
    let (llm, calls) = spawn_llm(200, completion(&content)).await;

    let (status, body) = post_json(
        app(Some(&llm), Some("test-key"), None),
        "/api/generate-tests",
        story(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(body["cases"].as_array().unwrap().len(), 2);
    assert_eq!(body["cases"][0]["id"], "TC-001");
    assert_eq!(body["cases"][1]["id"], "TC-CUSTOM");
    assert_eq!(body["cases"][1]["testData"], "password=nope");
    assert_eq!(body["model"], "mock-model");
    assert_eq!(body["promptTokens"], 120);
    assert_eq!(body["completionTokens"], 80);
}

#[tokio::test]
async fn test_generate_tests_non_json_content_is_sanitized() {
    let raw = "Sure! Here are some great test cases for you";
    let (llm, _) = spawn_llm(200, completion(raw)).await;

    let (status, text) = post_raw(
        app(Some(&llm), Some("test-key"), None),
        "/api/generate-tests",
        &story().to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let body: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body, json!({"error": "Failed to call LLM API"}));
    assert!(!text.contains("Sure! Here are"));
}

#[tokio::test]
async fn test_generate_tests_wrong_shape_is_llm_failure() {
    let (llm, _) = spawn_llm(200, completion(r#"{"tests": []}"#)).await;

    let (status, body) = post_json(
        app(Some(&llm), Some("test-key"), None),
        "/api/generate-tests",
        story(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Failed to call LLM API");
}

#[tokio::test]
async fn test_generate_tests_provider_error() {
    let (llm, _) = spawn_llm(429, json!({"error": {"message": "rate limited"}})).await;

    let (status, body) = post_json(
        app(Some(&llm), Some("test-key"), None),
        "/api/generate-tests",
        story(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({"error": "Failed to call LLM API"}));
}

#[tokio::test]
async fn test_generate_tests_validation() {
    let (llm, calls) = spawn_llm(200, completion(r#"{"cases": []}"#)).await;

    let (status, body) = post_json(
        app(Some(&llm), Some("test-key"), None),
        "/api/generate-tests",
        json!({"storyTitle": "   ", "acceptanceCriteria": "AC"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "storyTitle is required");

    let (status, body) = post_json(
        app(Some(&llm), Some("test-key"), None),
        "/api/generate-tests",
        json!({"storyTitle": "Login"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("acceptanceCriteria"));

    let (status, text) = post_raw(
        app(Some(&llm), Some("test-key"), None),
        "/api/generate-tests",
        "{not json",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&text).unwrap();
    assert!(body["error"].is_string());

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

// =============================================================================
// POST /api/mockdata
// =============================================================================

#[tokio::test]
async fn test_mockdata_preview_returns_prompt_only() {
    let (status, body) = post_json(
        app(None, None, None),
        "/api/mockdata",
        json!({"rows": 3, "schemaDescription": "id,email", "format": "json", "previewOnly": true}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let prompt = body["prompt"].as_str().unwrap();
    assert!(prompt.contains('3'));
    assert!(prompt.contains("id, email"));
    assert_eq!(body["format"], "json");
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn test_mockdata_preview_makes_no_llm_call() {
    let (llm, calls) = spawn_llm(200, completion("[]")).await;

    let (status, _) = post_json(
        app(Some(&llm), Some("test-key"), None),
        "/api/mockdata",
        json!({"schemaDescription": "id", "previewOnly": true}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_mockdata_without_key_uses_local_json() {
    let (status, body) = post_json(
        app(None, None, None),
        "/api/mockdata",
        json!({"rows": 5, "schemaDescription": "id, email"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["format"], "json");
    let data = body["data"].as_str().unwrap();
    assert!(data.starts_with("[\n  {"));

    let rows: Vec<Value> = serde_json::from_str(data).unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0], json!({"id": 1, "email": "user1@example.com"}));
    assert_eq!(rows[4]["id"], 5);
}

#[tokio::test]
async fn test_mockdata_local_csv_parses() {
    let (status, body) = post_json(
        app(None, None, None),
        "/api/mockdata",
        json!({"rows": 3, "schemaDescription": "id and full name", "format": "csv"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["format"], "csv");
    let data = body["data"].as_str().unwrap();

    let mut reader = csv::Reader::from_reader(data.as_bytes());
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, vec!["id", "name"]);
    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 3);
    assert_eq!(&records[2][1], "Test User 3");
}

#[tokio::test]
async fn test_mockdata_llm_failure_falls_back_to_local() {
    let (llm, calls) = spawn_llm(500, json!({"error": "upstream down"})).await;

    let (status, body) = post_json(
        app(Some(&llm), Some("test-key"), None),
        "/api/mockdata",
        json!({"rows": 2, "schemaDescription": "sku, price"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let rows: Vec<Value> = serde_json::from_str(body["data"].as_str().unwrap()).unwrap();
    assert_eq!(rows[1], json!({"id": 2, "value": "value_2"}));
}

#[tokio::test]
async fn test_mockdata_llm_json_is_pretty_printed() {
    let (llm, _) = spawn_llm(200, completion(r#"[{"sku":"A1","price":9.5}]"#)).await;

    let (status, body) = post_json(
        app(Some(&llm), Some("test-key"), None),
        "/api/mockdata",
        json!({"rows": 1, "schemaDescription": "sku, price"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        "[\n  {\n    \"sku\": \"A1\",\n    \"price\": 9.5\n  }\n]"
    );
}

#[tokio::test]
async fn test_mockdata_llm_text_passes_through() {
    let (llm, _) = spawn_llm(200, completion("sku,price\nA1,9.5")).await;

    let (status, body) = post_json(
        app(Some(&llm), Some("test-key"), None),
        "/api/mockdata",
        json!({"rows": 1, "schemaDescription": "sku, price", "format": "csv"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], "sku,price\nA1,9.5");

    let (llm, _) = spawn_llm(200, completion("Here is your data: nope")).await;
    let (status, body) = post_json(
        app(Some(&llm), Some("test-key"), None),
        "/api/mockdata",
        json!({"rows": 1, "schemaDescription": "sku", "format": "json"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], "Here is your data: nope");
}

#[tokio::test]
async fn test_mockdata_validation() {
    let (status, body) = post_json(
        app(None, None, None),
        "/api/mockdata",
        json!({"rows": 0, "schemaDescription": "id"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "rows must be between 1 and 10000");

    let (status, body) = post_json(
        app(None, None, None),
        "/api/mockdata",
        json!({"rows": 5, "schemaDescription": "  "}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "schemaDescription is required");

    let (status, body) = post_json(
        app(None, None, None),
        "/api/mockdata",
        json!({"rows": 5, "schemaDescription": ",,,", "previewOnly": true}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "schemaDescription is required");

    let (status, body) = post_json(
        app(None, None, None),
        "/api/mockdata",
        json!({"schemaDescription": "id", "format": "xml"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}
