//! Chat-completion gateway for the LLM provider
//!
//! A single explicitly constructed client is shared by every request through
//! the server state. Errors never carry the provider's response body: only the
//! status line is kept, and a short body snippet is logged at debug level.

use crate::config::LlmSettings;
use crate::utils::snippet;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

const STRUCTURED_TEMPERATURE: f32 = 0.2;
const RAW_TEMPERATURE: f32 = 0.6;
const RAW_MAX_TOKENS: u32 = 20_000;
const ERROR_LOG_SNIPPET_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM API error: {status} {reason}")]
    Provider { status: u16, reason: String },

    #[error("No content received from LLM API")]
    EmptyResponse,

    #[error("Invalid JSON response from LLM API: {0}")]
    MalformedResponse(String),

    #[error("Failed to reach LLM API: {0}")]
    Transport(String),
}

/// Content plus usage metadata from a structured (JSON) completion
#[derive(Debug, Clone)]
pub struct StructuredCompletion {
    /// Raw content as returned by the model
    pub content: String,
    /// The content parsed as JSON
    pub value: Value,
    pub model: Option<String>,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<AssistantMessage>,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

struct Completion {
    content: String,
    model: Option<String>,
    usage: Usage,
}

/// OpenAI-compatible chat-completion client
pub struct ChatCompletionClient {
    http: reqwest::Client,
    settings: LlmSettings,
}

impl ChatCompletionClient {
    pub fn new(settings: LlmSettings, http: reqwest::Client) -> Self {
        if settings.has_api_key() {
            log::info!("[llm] API key configured");
            log::info!("[llm] Using model: {}", settings.model);
            log::info!("[llm] API endpoint: {}", settings.completions_endpoint());
        } else {
            log::warn!("[llm] No LLM API key configured; generation requests will fail and mock data will use the local generator");
        }
        Self { http, settings }
    }

    pub fn has_api_key(&self) -> bool {
        self.settings.has_api_key()
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Completion whose content must be a JSON document
    pub async fn generate_structured(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<StructuredCompletion, LlmError> {
        let result = self.structured(system_prompt, user_prompt).await;
        if let Err(ref e) = result {
            log::error!("[llm] Error calling LLM API: {}", e);
        }
        result
    }

    async fn structured(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<StructuredCompletion, LlmError> {
        let completion = self
            .complete(system_prompt, user_prompt, STRUCTURED_TEMPERATURE, None)
            .await?;

        let value: Value = serde_json::from_str(&completion.content)
            .map_err(|e| LlmError::MalformedResponse(e.to_string()))?;

        Ok(StructuredCompletion {
            content: completion.content,
            value,
            model: completion.model,
            prompt_tokens: completion.usage.prompt_tokens,
            completion_tokens: completion.usage.completion_tokens,
        })
    }

    /// Completion returned as plain text, no schema expectations
    pub async fn generate_raw(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, LlmError> {
        let result = self
            .complete(
                system_prompt,
                user_prompt,
                RAW_TEMPERATURE,
                Some(RAW_MAX_TOKENS),
            )
            .await
            .map(|c| c.content);

        if let Err(ref e) = result {
            log::error!("[llm] Error calling LLM API (raw): {}", e);
        }
        result
    }

    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
        max_tokens: Option<u32>,
    ) -> Result<Completion, LlmError> {
        let endpoint = self.settings.completions_endpoint();
        let body = build_request(
            &self.settings.model,
            system_prompt,
            user_prompt,
            temperature,
            max_tokens,
        );

        log::info!(
            "[llm] POST {} (model: {}, api key: {})",
            endpoint,
            self.settings.model,
            if self.has_api_key() { "present" } else { "not set" }
        );

        let mut request = self.http.post(&endpoint).json(&body);
        if let Some(key) = self.settings.api_key.as_deref() {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        log::info!("[llm] Response status: {}", status);

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            log::debug!(
                "[llm] Error body (truncated): {}",
                snippet(&text, ERROR_LOG_SNIPPET_CHARS)
            );
            return Err(LlmError::Provider {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let envelope: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Transport(e.without_url().to_string()))?;

        extract_completion(envelope)
    }
}

fn build_request<'a>(
    model: &'a str,
    system_prompt: &'a str,
    user_prompt: &'a str,
    temperature: f32,
    max_tokens: Option<u32>,
) -> ChatCompletionRequest<'a> {
    let mut messages = Vec::with_capacity(2);
    if !system_prompt.is_empty() {
        messages.push(ChatMessage {
            role: "system",
            content: system_prompt,
        });
    }
    messages.push(ChatMessage {
        role: "user",
        content: user_prompt,
    });

    ChatCompletionRequest {
        model,
        messages,
        temperature,
        max_tokens,
    }
}

fn extract_completion(envelope: ChatCompletionResponse) -> Result<Completion, LlmError> {
    let content = envelope
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .filter(|content| !content.is_empty())
        .ok_or(LlmError::EmptyResponse)?;

    Ok(Completion {
        content,
        model: envelope.model,
        usage: envelope.usage.unwrap_or_default(),
    })
}
