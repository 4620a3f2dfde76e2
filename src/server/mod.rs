//! HTTP server for the story-to-tests API
//!
//! Serves test case generation, Jira story lookup and mock data endpoints
//! to the browser frontend.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use state::ServerAppState;

use crate::config::ServerSettings;
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue,
    },
    routing::get,
    Json, Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

/// Version information for the server
#[derive(serde::Serialize)]
struct VersionInfo {
    version: String,
}

/// Permissive unless explicit origins are configured
fn cors_layer(cors_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    if cors_origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        let allowed_origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|o| o.parse().ok()).collect();
        layer.allow_origin(allowed_origins)
    }
}

/// Full application router with CORS applied
pub fn build_router(state: ServerAppState, cors_origins: &[String]) -> Router {
    Router::new()
        .merge(routes::api_routes())
        .route("/health", get(health_handler))
        .route("/api/version", get(version_handler))
        .route("/", get(index_handler))
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// Run the HTTP server until shutdown is requested
pub async fn run_server(settings: &ServerSettings, state: ServerAppState) -> Result<(), String> {
    let addr: SocketAddr = format!("{}:{}", settings.bind, settings.port)
        .parse()
        .map_err(|e| format!("Invalid address: {}", e))?;

    let cors_display = if settings.cors_origins.is_empty() {
        "*".to_string()
    } else {
        settings.cors_origins.join(", ")
    };
    let llm_status = if state.llm.has_api_key() {
        state.llm.model().to_string()
    } else {
        "not configured (mock data uses local generator)".to_string()
    };
    let jira_status = match state.jira.as_deref() {
        Some(jira) => jira.base_url().to_string(),
        None => "not configured".to_string(),
    };

    let border = "═".repeat(BANNER_WIDTH);
    println!("\n╔{}╗", border);
    let title = format!("{:^width$}", "Story To Tests API Server", width = BANNER_WIDTH);
    println!("{}", banner_row(&title));
    println!("╠{}╣", border);
    println!("{}", banner_row(""));
    println!("{}", banner_row(&format!("  Server URL: http://{}:{}", settings.bind, settings.port)));
    println!("{}", banner_row(""));
    println!("{}", banner_row(&format!("  CORS Origins: {}", cors_display)));
    println!("{}", banner_row(&format!("  LLM Model: {}", llm_status)));
    println!("{}", banner_row(&format!("  Jira: {}", jira_status)));
    println!("{}", banner_row(""));
    println!("{}", banner_row("  Endpoints:"));
    println!("{}", banner_row("    POST /api/generate-tests   - Generate test cases"));
    println!("{}", banner_row("    GET  /api/jira/story/:id   - Fetch Jira story fields"));
    println!("{}", banner_row("    GET  /api/jira/auth-check  - Verify Jira credentials"));
    println!("{}", banner_row("    POST /api/mockdata         - Generate mock data"));
    println!("{}", banner_row("    GET  /health               - Health check"));
    println!("{}", banner_row(""));
    println!("╚{}╝\n", border);

    let app = build_router(state.clone(), &settings.cors_origins);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    log::info!("Server listening on http://{}", addr);

    let shutdown_state = state.shutdown_state.clone();
    let shutdown_signal = async move {
        shutdown_state.wait().await;
        log::info!("Shutdown signal received, stopping server...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| format!("Server error: {}", e))
}

/// Inner width of the startup banner box
const BANNER_WIDTH: usize = 62;

/// One boxed banner line, padded or cut to `BANNER_WIDTH` columns
fn banner_row(text: &str) -> String {
    let mut inner: String = text.chars().take(BANNER_WIDTH).collect();
    if text.chars().count() > BANNER_WIDTH {
        inner.pop();
        inner.push('…');
    }
    format!("║{:<width$}║", inner, width = BANNER_WIDTH)
}

/// Health check endpoint
async fn health_handler() -> &'static str {
    "OK"
}

/// Version endpoint
async fn version_handler() -> Json<VersionInfo> {
    Json(VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Index handler - lists the API endpoints
async fn index_handler() -> axum::response::Html<&'static str> {
    axum::response::Html(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Story To Tests API</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            max-width: 600px;
            margin: 50px auto;
            padding: 20px;
            background: #1a1a2e;
            color: #eee;
        }
        h1 { color: #4ade80; }
        code {
            background: #2a2a4e;
            padding: 2px 6px;
            border-radius: 4px;
            font-family: 'Monaco', 'Consolas', monospace;
        }
        .endpoint {
            background: #2a2a4e;
            padding: 10px;
            border-radius: 8px;
            margin: 10px 0;
        }
    </style>
</head>
<body>
    <h1>Story To Tests API</h1>
    <p>The API server is running. Point the frontend at this address.</p>
    <h2>Endpoints</h2>
    <div class="endpoint">
        <strong>POST /api/generate-tests</strong><br>
        Generate test cases from <code>{storyTitle, acceptanceCriteria, ...}</code>
    </div>
    <div class="endpoint">
        <strong>GET /api/jira/story/:id</strong><br>
        Story fields from a Jira issue (<code>?debug=true</code>, <code>?clean=true</code>)
    </div>
    <div class="endpoint">
        <strong>GET /api/jira/auth-check</strong><br>
        Verify the configured Jira credentials
    </div>
    <div class="endpoint">
        <strong>POST /api/mockdata</strong><br>
        Sample rows as JSON or CSV from a schema description
    </div>
    <div class="endpoint">
        <strong>GET /health</strong><br>
        Health check endpoint
    </div>
</body>
</html>"#,
    )
}
