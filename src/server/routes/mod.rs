//! HTTP route handlers
//!
//! One module per feature:
//! - generate_routes: test case generation from a user story
//! - jira_routes: Jira issue lookup and credential check
//! - mockdata_routes: mock data generation

pub mod generate_routes;
pub mod jira_routes;
pub mod mockdata_routes;

use axum::{
    routing::{get, post},
    Router,
};

use super::ServerAppState;

/// All `/api` feature routes
pub fn api_routes() -> Router<ServerAppState> {
    Router::new()
        .route(
            "/api/generate-tests",
            post(generate_routes::generate_tests_handler),
        )
        .route("/api/jira/story/:id", get(jira_routes::story_handler))
        .route("/api/jira/auth-check", get(jira_routes::auth_check_handler))
        .route("/api/mockdata", post(mockdata_routes::mock_data_handler))
}
