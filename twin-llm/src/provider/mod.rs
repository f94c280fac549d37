//! # LLM Provider Interface
//!
//! A trait-based abstraction for talking to model backends.
//!
//! ## Design
//! - `LlmProvider` trait defines the core interface
//! - Implementations for OpenAI (and compatible servers such as Ollama),
//!   Anthropic, and an in-process mock
//! - `HostedProvider` picks one of the HTTP providers at runtime
//! - One request per call, no retries

pub mod anthropic;
pub mod mock;
pub mod openai;

pub use anthropic::AnthropicProvider;
pub use mock::MockProvider;
pub use openai::OpenAIProvider;

use crate::config::{ProviderConfig, ProviderType, SamplingConfig};
use crate::error::{ProviderError, Result};
use serde::{Deserialize, Serialize};

// ============================================================================
// Core Types
// ============================================================================

/// A chat message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Request parameters for a completion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<usize>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Copy temperature and token limit from `sampling`
    pub fn with_sampling(mut self, sampling: &SamplingConfig) -> Self {
        self.temperature = sampling.temperature;
        self.max_tokens = sampling.max_tokens;
        self
    }
}

/// Response from a completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    pub id: String,
    pub model: String,
    pub content: Option<String>,
    pub finish_reason: FinishReason,
    pub usage: Usage,
}

impl CompletionResponse {
    /// The text content, treating whitespace-only output as missing
    pub fn text(&self) -> Option<&str> {
        self.content.as_deref().filter(|c| !c.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    Unknown,
}

/// Token usage information
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

// ============================================================================
// Provider Trait
// ============================================================================

/// The main LLM provider trait
#[allow(async_fn_in_trait)]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name (e.g., "openai", "anthropic")
    fn name(&self) -> &str;

    /// Get the model used when a request does not name one
    fn default_model(&self) -> &str;

    /// Send a completion request and get a full response
    async fn complete(&self, request: CompletionRequest) -> std::result::Result<CompletionResponse, ProviderError>;

    /// Send `messages` once and return the text of the answer
    async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        sampling: &SamplingConfig,
    ) -> std::result::Result<String, ProviderError> {
        let request = CompletionRequest::new(messages).with_sampling(sampling);
        let response = self.complete(request).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(ProviderError::EmptyResponse)
    }
}

// ============================================================================
// Runtime provider selection
// ============================================================================

/// One of the HTTP providers, chosen from a [`ProviderConfig`] at runtime
#[derive(Debug)]
pub enum HostedProvider {
    OpenAI(OpenAIProvider),
    Anthropic(AnthropicProvider),
}

impl HostedProvider {
    /// Build the client for `config`.
    ///
    /// Fails with `ConfigMissing` if a hosted provider has no API key; no
    /// network traffic happens here.
    pub fn connect(config: ProviderConfig) -> Result<Self> {
        match config.provider_type {
            ProviderType::OpenAI | ProviderType::Ollama => {
                OpenAIProvider::new(config).map(Self::OpenAI)
            }
            ProviderType::Anthropic => AnthropicProvider::new(config).map(Self::Anthropic),
        }
    }
}

impl LlmProvider for HostedProvider {
    fn name(&self) -> &str {
        match self {
            Self::OpenAI(p) => p.name(),
            Self::Anthropic(p) => p.name(),
        }
    }

    fn default_model(&self) -> &str {
        match self {
            Self::OpenAI(p) => p.default_model(),
            Self::Anthropic(p) => p.default_model(),
        }
    }

    async fn complete(&self, request: CompletionRequest) -> std::result::Result<CompletionResponse, ProviderError> {
        match self {
            Self::OpenAI(p) => p.complete(request).await,
            Self::Anthropic(p) => p.complete(request).await,
        }
    }
}

// ============================================================================
// Shared HTTP helpers
// ============================================================================

/// Map a non-success HTTP status to a provider error
pub(crate) fn status_error(status: u16, retry_after: Option<u64>, body: &str) -> ProviderError {
    match status {
        401 | 403 => ProviderError::AuthenticationFailed,
        429 => ProviderError::RateLimited { retry_after },
        _ => ProviderError::Api {
            status,
            message: api_error_message(body),
        },
    }
}

/// Pull `error.message` out of a JSON error body, falling back to the raw text
pub(crate) fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

pub(crate) fn retry_after_secs(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_constructors() {
        let sys = ChatMessage::system("You are helpful");
        assert_eq!(sys.role, Role::System);
        assert_eq!(sys.content, "You are helpful");

        assert_eq!(ChatMessage::user("Hello").role, Role::User);
        assert_eq!(Role::Assistant.as_str(), "assistant");
    }

    #[test]
    fn test_completion_request_builder() {
        let sampling = SamplingConfig::default().with_max_tokens(1000);
        let request = CompletionRequest::new(vec![ChatMessage::user("Hello")])
            .with_model("gpt-4o")
            .with_sampling(&sampling);

        assert_eq!(request.model, Some("gpt-4o".into()));
        assert_eq!(request.temperature, Some(0.7));
        assert_eq!(request.max_tokens, Some(1000));
    }

    #[test]
    fn test_with_sampling_overrides_both_fields() {
        let sampling = SamplingConfig {
            temperature: None,
            max_tokens: Some(64),
        };
        let request = CompletionRequest::new(vec![])
            .with_sampling(&SamplingConfig::default().with_max_tokens(8))
            .with_sampling(&sampling);

        assert_eq!(request.temperature, None);
        assert_eq!(request.max_tokens, Some(64));
    }

    #[test]
    fn test_response_text_ignores_whitespace() {
        let mut response = CompletionResponse {
            id: "r1".into(),
            model: "m".into(),
            content: Some("  \n".into()),
            finish_reason: FinishReason::Stop,
            usage: Usage::default(),
        };
        assert_eq!(response.text(), None);

        response.content = Some("hello".into());
        assert_eq!(response.text(), Some("hello"));
    }

    #[test]
    fn test_status_error_mapping() {
        assert_eq!(status_error(401, None, ""), ProviderError::AuthenticationFailed);
        assert_eq!(status_error(403, None, ""), ProviderError::AuthenticationFailed);
        assert_eq!(
            status_error(429, Some(7), ""),
            ProviderError::RateLimited {
                retry_after: Some(7)
            }
        );
        assert_eq!(
            status_error(500, None, r#"{"error":{"message":"server melted"}}"#),
            ProviderError::Api {
                status: 500,
                message: "server melted".into()
            }
        );
        assert_eq!(
            status_error(502, None, " bad gateway \n"),
            ProviderError::Api {
                status: 502,
                message: "bad gateway".into()
            }
        );
    }

    #[test]
    fn test_connect_without_key_is_config_error() {
        let mut config = ProviderConfig::openai("");
        config.api_key = None;
        let err = HostedProvider::connect(config).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::ConfigMissing);

        let err = HostedProvider::connect(ProviderConfig::anthropic("  ")).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::ConfigMissing);
        assert_eq!(err.context_value("setting"), Some("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn test_connect_picks_provider() {
        let provider = HostedProvider::connect(ProviderConfig::openai("sk-test")).unwrap();
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.default_model(), "gpt-4o-mini");

        let provider = HostedProvider::connect(ProviderConfig::ollama("llama3")).unwrap();
        assert_eq!(provider.name(), "ollama");
        assert_eq!(provider.default_model(), "llama3");

        let provider = HostedProvider::connect(ProviderConfig::anthropic("sk-ant")).unwrap();
        assert_eq!(provider.name(), "anthropic");
    }
}
