// Clippy allows for reasonable defaults
// These suppress warnings where the suggested change doesn't improve readability
#![allow(clippy::new_without_default)] // Default not always appropriate for stateful types
#![allow(clippy::derivable_impls)] // Explicit Default impls can be clearer
#![allow(clippy::unnecessary_map_or)] // map_or can be clearer than alternatives
#![allow(clippy::redundant_closure)] // |x| f(x) can be clearer than f

// Module declarations
pub mod config;
pub mod jira;
pub mod llm;
pub mod mock_data;
pub mod models;
pub mod prompt_builder;
pub mod shutdown;
pub mod utils;

// Server module (HTTP API)
pub mod server;

// Re-export models for use in routes and tests
pub use models::{
    FallbackIssue, GenerateResponse, IssueFields, MockDataFormat, MockDataRequest,
    MockDataResponse, StoryRequest, TestCase,
};
