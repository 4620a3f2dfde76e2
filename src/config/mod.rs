// Server configuration: LLM provider, Jira credentials and HTTP binding
//
// Settings are resolved once at startup (CLI/env -> config file -> defaults)
// and shared read-only with the request handlers.

pub mod merger;

pub use merger::{
    ConfigMerger, PartialJiraSettings, PartialLlmSettings, PartialServerSettings, PartialSettings,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_LLM_MODEL: &str = "llama3-8b-8192";
pub const DEFAULT_PORT: u16 = 8090;
pub const DEFAULT_BIND: &str = "0.0.0.0";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Jira credentials not configured on server")]
    MissingJiraCredentials,

    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub llm: LlmSettings,
    pub jira: JiraSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub port: u16,
    pub bind: String,
    /// Empty means any origin
    pub cors_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
            cors_origins: Vec::new(),
        }
    }
}

/// Chat-completion provider settings
#[derive(Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_LLM_MODEL.to_string(),
        }
    }
}

impl LlmSettings {
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    pub fn completions_endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

// Never print the key itself
impl fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &if self.has_api_key() { "<set>" } else { "<unset>" })
            .field("model", &self.model)
            .finish()
    }
}

/// Jira Cloud settings. All three values are required for the tracker routes.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct JiraSettings {
    pub base_url: Option<String>,
    pub user_email: Option<String>,
    pub api_token: Option<String>,
}

/// Complete Jira credentials, only constructed when every value is present
#[derive(Clone)]
pub struct JiraCredentials {
    pub base_url: String,
    pub user_email: String,
    pub api_token: String,
}

impl JiraSettings {
    pub fn credentials(&self) -> Result<JiraCredentials, ConfigError> {
        let present = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        match (
            present(&self.base_url),
            present(&self.user_email),
            present(&self.api_token),
        ) {
            (Some(base_url), Some(user_email), Some(api_token)) => Ok(JiraCredentials {
                base_url: base_url.trim_end_matches('/').to_string(),
                user_email,
                api_token,
            }),
            _ => Err(ConfigError::MissingJiraCredentials),
        }
    }
}

impl fmt::Debug for JiraSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JiraSettings")
            .field("base_url", &self.base_url)
            .field("user_email", &self.user_email)
            .field(
                "api_token",
                &if self.api_token.is_some() { "<set>" } else { "<unset>" },
            )
            .finish()
    }
}

/// Default config file location (~/.story-to-tests/config.toml)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".story-to-tests").join("config.toml"))
}

/// Load a partial config from a TOML file
pub fn load_config_file(path: &Path) -> Result<PartialSettings, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
