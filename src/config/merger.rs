// Configuration merging with priority

use super::{JiraSettings, LlmSettings, ServerSettings, Settings};
use serde::{Deserialize, Serialize};

/// Partial configuration for merging
/// Uses Option<T> for all fields to support partial overrides
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PartialSettings {
    #[serde(default)]
    pub server: Option<PartialServerSettings>,
    #[serde(default)]
    pub llm: Option<PartialLlmSettings>,
    #[serde(default)]
    pub jira: Option<PartialJiraSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PartialServerSettings {
    pub port: Option<u16>,
    pub bind: Option<String>,
    pub cors_origins: Option<Vec<String>>,
}

#[derive(Clone, Serialize, Deserialize, Default)]
pub struct PartialLlmSettings {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
}

#[derive(Clone, Serialize, Deserialize, Default)]
pub struct PartialJiraSettings {
    pub base_url: Option<String>,
    pub user_email: Option<String>,
    pub api_token: Option<String>,
}

// Secrets stay out of debug output
impl std::fmt::Debug for PartialLlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartialLlmSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<set>"))
            .field("model", &self.model)
            .finish()
    }
}

impl std::fmt::Debug for PartialJiraSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartialJiraSettings")
            .field("base_url", &self.base_url)
            .field("user_email", &self.user_email)
            .field("api_token", &self.api_token.as_ref().map(|_| "<set>"))
            .finish()
    }
}

/// Configuration merger
/// Priority order: CLI/env -> config file -> defaults
pub struct ConfigMerger {
    defaults: Settings,
    file: Option<PartialSettings>,
    cli: Option<PartialSettings>,
}

impl ConfigMerger {
    /// Create a new config merger with defaults
    pub fn new() -> Self {
        Self {
            defaults: Settings::default(),
            file: None,
            cli: None,
        }
    }

    /// Set config file values
    pub fn with_file(mut self, config: Option<PartialSettings>) -> Self {
        self.file = config;
        self
    }

    /// Set CLI/env overrides
    pub fn with_cli(mut self, config: Option<PartialSettings>) -> Self {
        self.cli = config;
        self
    }

    /// Merge all layers with priority
    pub fn merge(&self) -> Settings {
        let mut result = self.defaults.clone();

        if let Some(ref file) = self.file {
            result = self.merge_partial(&result, file);
        }

        // CLI overrides (highest priority)
        if let Some(ref cli) = self.cli {
            result = self.merge_partial(&result, cli);
        }

        result
    }

    fn merge_partial(&self, base: &Settings, partial: &PartialSettings) -> Settings {
        Settings {
            server: partial
                .server
                .as_ref()
                .map(|p| self.merge_server(&base.server, p))
                .unwrap_or_else(|| base.server.clone()),
            llm: partial
                .llm
                .as_ref()
                .map(|p| self.merge_llm(&base.llm, p))
                .unwrap_or_else(|| base.llm.clone()),
            jira: partial
                .jira
                .as_ref()
                .map(|p| self.merge_jira(&base.jira, p))
                .unwrap_or_else(|| base.jira.clone()),
        }
    }

    fn merge_server(&self, base: &ServerSettings, over: &PartialServerSettings) -> ServerSettings {
        ServerSettings {
            port: over.port.unwrap_or(base.port),
            bind: non_blank(&over.bind).unwrap_or_else(|| base.bind.clone()),
            cors_origins: over
                .cors_origins
                .clone()
                .filter(|origins| !origins.is_empty())
                .unwrap_or_else(|| base.cors_origins.clone()),
        }
    }

    fn merge_llm(&self, base: &LlmSettings, over: &PartialLlmSettings) -> LlmSettings {
        LlmSettings {
            base_url: non_blank(&over.base_url).unwrap_or_else(|| base.base_url.clone()),
            api_key: non_blank(&over.api_key).or_else(|| base.api_key.clone()),
            model: non_blank(&over.model).unwrap_or_else(|| base.model.clone()),
        }
    }

    fn merge_jira(&self, base: &JiraSettings, over: &PartialJiraSettings) -> JiraSettings {
        JiraSettings {
            base_url: non_blank(&over.base_url).or_else(|| base.base_url.clone()),
            user_email: non_blank(&over.user_email).or_else(|| base.user_email.clone()),
            api_token: non_blank(&over.api_token).or_else(|| base.api_token.clone()),
        }
    }
}

impl Default for ConfigMerger {
    fn default() -> Self {
        Self::new()
    }
}

/// Env vars set to "" count as unset
fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
