//! Shared helpers for API integration tests: in-process upstream mocks and
//! request plumbing around the router.

#![allow(dead_code)]

use axum::{
    body::Body,
    extract::Query,
    http::{HeaderMap, Request, StatusCode},
    routing::{get, post},
    Json, Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use story_to_tests_lib::config::{JiraSettings, LlmSettings, Settings};
use story_to_tests_lib::server::{build_router, ServerAppState};
use story_to_tests_lib::shutdown::ShutdownState;
use tokio::net::TcpListener;
use tower::ServiceExt;

/// Serve `app` on an ephemeral local port and return its base URL
pub async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{}", addr)
}

/// Base URL of a port nothing listens on
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Chat-completion provider answering every call with `status` and `body`.
/// Returns the `/v1` base URL and a call counter.
pub async fn spawn_llm(status: u16, body: Value) -> (String, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let app = Router::new().route(
        "/v1/chat/completions",
        post(move || {
            let body = body.clone();
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                (StatusCode::from_u16(status).unwrap(), Json(body))
            }
        }),
    );
    let base = spawn(app).await;
    (format!("{}/v1", base), calls)
}

/// Provider envelope carrying `content` as the assistant message
pub fn completion(content: &str) -> Value {
    serde_json::json!({
        "model": "mock-model",
        "choices": [{"message": {"role": "assistant", "content": content}}],
        "usage": {"prompt_tokens": 120, "completion_tokens": 80}
    })
}

/// Scripted replies per Jira endpoint. Each call takes the next reply; the
/// last one repeats. An empty script answers 404.
#[derive(Clone, Default)]
pub struct JiraScript {
    pub issue: Vec<(u16, String)>,
    pub modern_search: Vec<(u16, String)>,
    pub legacy_search: Vec<(u16, String)>,
    pub myself: Vec<(u16, String)>,
}

#[derive(Default)]
pub struct JiraHits {
    pub issue: AtomicUsize,
    pub modern_search: AtomicUsize,
    pub legacy_search: AtomicUsize,
    pub myself: AtomicUsize,
    pub last_jql: Mutex<Option<String>>,
    pub last_issue_key: Mutex<Option<String>>,
}

impl JiraHits {
    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

fn scripted(script: &[(u16, String)], counter: &AtomicUsize) -> (StatusCode, String) {
    let index = counter.fetch_add(1, Ordering::SeqCst);
    match script.get(index).or_else(|| script.last()) {
        Some((status, body)) => (StatusCode::from_u16(*status).unwrap(), body.clone()),
        None => (StatusCode::NOT_FOUND, String::new()),
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Basic "))
}

pub async fn spawn_jira(script: JiraScript) -> (String, Arc<JiraHits>) {
    let script = Arc::new(script);
    let hits = Arc::new(JiraHits::default());

    let (s, h) = (script.clone(), hits.clone());
    let issue = get(
        move |axum::extract::Path(key): axum::extract::Path<String>, headers: HeaderMap| {
            let (s, h) = (s.clone(), h.clone());
            async move {
                if !authorized(&headers) {
                    return (StatusCode::UNAUTHORIZED, "missing basic auth".to_string());
                }
                *h.last_issue_key.lock().unwrap() = Some(key);
                scripted(&s.issue, &h.issue)
            }
        },
    );

    let (s, h) = (script.clone(), hits.clone());
    let modern = get(move |Query(q): Query<HashMap<String, String>>| {
        let (s, h) = (s.clone(), h.clone());
        async move {
            *h.last_jql.lock().unwrap() = q.get("jql").cloned();
            scripted(&s.modern_search, &h.modern_search)
        }
    });

    let (s, h) = (script.clone(), hits.clone());
    let legacy = get(move |Query(q): Query<HashMap<String, String>>| {
        let (s, h) = (s.clone(), h.clone());
        async move {
            *h.last_jql.lock().unwrap() = q.get("jql").cloned();
            scripted(&s.legacy_search, &h.legacy_search)
        }
    });

    let (s, h) = (script.clone(), hits.clone());
    let myself = get(move || {
        let (s, h) = (s.clone(), h.clone());
        async move { scripted(&s.myself, &h.myself) }
    });

    let app = Router::new()
        .route("/rest/api/3/issue/:key", issue)
        .route("/rest/api/3/search/jql", modern)
        .route("/rest/api/3/search", legacy)
        .route("/rest/api/3/myself", myself);

    (spawn(app).await, hits)
}

/// Application router wired to the given upstreams
pub fn app(llm_base: Option<&str>, llm_key: Option<&str>, jira_base: Option<&str>) -> Router {
    let mut settings = Settings::default();
    settings.llm = LlmSettings {
        base_url: llm_base.unwrap_or("http://127.0.0.1:9/v1").to_string(),
        api_key: llm_key.map(str::to_string),
        model: "mock-model".to_string(),
    };
    if let Some(base) = jira_base {
        settings.jira = JiraSettings {
            base_url: Some(base.to_string()),
            user_email: Some("qa@example.com".to_string()),
            api_token: Some("jira-token".to_string()),
        };
    }

    let state = ServerAppState::from_settings(&settings, reqwest::Client::new(), ShutdownState::new());
    build_router(state, &[])
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

pub async fn get_text(app: Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, text) = get_text(app, uri).await;
    (status, serde_json::from_str(&text).unwrap())
}

pub async fn post_raw(app: Router, uri: &str, body: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let (status, text) = post_raw(app, uri, &body.to_string()).await;
    (status, serde_json::from_str(&text).unwrap())
}
