//! Chat-completion client for the hosted Groq inference API.
//!
//! Groq exposes an OpenAI-compatible `/chat/completions` endpoint. Both services send a
//! system/user message pair and read back the first choice. Failures are reported once; there is
//! no retry or backoff.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Chat model used when `GROQ_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "openai/gpt-oss-120b";

/// Sampling temperature used by both services.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Label reported to API callers for a Groq-hosted model.
pub fn model_label(model: &str) -> String {
    format!("{model} (Groq)")
}

/// Errors surfaced while requesting a chat completion.
#[derive(Debug, Error)]
pub enum LlmClientError {
    /// The HTTP client could not be constructed or the API was unreachable.
    #[error("Chat provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Chat completion failed: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed or carried no content.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Role attached to a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Instruction framing the assistant's behavior.
    System,
    /// Caller-supplied content.
    User,
}

/// Single role-tagged message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    /// Author role.
    pub role: ChatRole,
    /// Message body.
    pub content: String,
}

impl ChatMessage {
    /// Build a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    /// Build a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Request payload passed to the chat provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    /// Model identifier understood by the provider.
    pub model: String,
    /// Ordered conversation, system instruction first.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature.
    pub temperature: f32,
}

/// Interface implemented by chat-completion providers.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Generate the assistant reply for `request`.
    async fn complete(&self, request: ChatRequest) -> Result<String, LlmClientError>;
}

/// Groq chat-completion client.
pub struct GroqChatClient {
    http: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

impl GroqChatClient {
    /// Build a client for `base_url` (e.g. `https://api.groq.com/openai/v1`).
    pub fn new(base_url: String, api_key: String) -> Result<Self, LlmClientError> {
        let http = Client::builder()
            .user_agent("research-backend/chat")
            .build()
            .map_err(|error| LlmClientError::ProviderUnavailable(error.to_string()))?;
        tracing::debug!(url = %base_url, "Initialized Groq chat client");
        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ChatClient for GroqChatClient {
    async fn complete(&self, request: ChatRequest) -> Result<String, LlmClientError> {
        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            "Requesting chat completion"
        );
        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(self.api_key.trim())
            .json(&request)
            .send()
            .await
            .map_err(|error| {
                LlmClientError::ProviderUnavailable(format!(
                    "failed to reach {}: {error}",
                    self.base_url
                ))
            })?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(LlmClientError::GenerationFailed(
                "Groq rejected the API key (401)".into(),
            ));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmClientError::GenerationFailed(format!(
                "Groq returned {status}: {body}"
            )));
        }

        let body: CompletionResponse = response.json().await.map_err(|error| {
            LlmClientError::InvalidResponse(format!("failed to decode completion: {error}"))
        })?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmClientError::InvalidResponse("completion had no content".into()))
    }
}
