//! Server application state shared across handlers

use crate::config::{ConfigError, Settings};
use crate::jira::JiraClient;
use crate::llm::ChatCompletionClient;
use crate::shutdown::ShutdownState;
use std::sync::Arc;

/// Shared state for the server. Clients are built once at startup and shared
/// by every request.
#[derive(Clone)]
pub struct ServerAppState {
    /// LLM chat-completion gateway
    pub llm: Arc<ChatCompletionClient>,

    /// Jira client, absent when credentials are not configured
    pub jira: Option<Arc<JiraClient>>,

    /// Shutdown state
    pub shutdown_state: ShutdownState,
}

impl ServerAppState {
    pub fn new(
        llm: ChatCompletionClient,
        jira: Option<JiraClient>,
        shutdown_state: ShutdownState,
    ) -> Self {
        Self {
            llm: Arc::new(llm),
            jira: jira.map(Arc::new),
            shutdown_state,
        }
    }

    /// Build both upstream clients from resolved settings over one HTTP connection pool
    pub fn from_settings(
        settings: &Settings,
        http: reqwest::Client,
        shutdown_state: ShutdownState,
    ) -> Self {
        let llm = ChatCompletionClient::new(settings.llm.clone(), http.clone());

        let jira = match settings.jira.credentials() {
            Ok(credentials) => Some(JiraClient::new(credentials, http)),
            Err(e) => {
                log::warn!("[jira] {}; Jira routes will report a configuration error", e);
                None
            }
        };

        Self::new(llm, jira, shutdown_state)
    }

    /// The Jira client, or the configuration error the routes report
    pub fn jira(&self) -> Result<&JiraClient, ConfigError> {
        self.jira
            .as_deref()
            .ok_or(ConfigError::MissingJiraCredentials)
    }
}
