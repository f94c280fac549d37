//! Anthropic Claude provider implementation

use super::*;
use crate::error::Error;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: usize = 4096;

/// Anthropic Claude provider
#[derive(Debug)]
pub struct AnthropicProvider {
    client: Client,
    config: ProviderConfig,
}

impl AnthropicProvider {
    /// Create the client. Fails with `ConfigMissing` without an API key.
    pub fn new(config: ProviderConfig) -> Result<Self> {
        config.require_credential()?;

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                Error::unexpected("failed to create HTTP client")
                    .with_operation("anthropic::new")
                    .set_source(e)
            })?;

        Ok(Self { client, config })
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// Anthropic takes the system prompt as a top-level field, so system
    /// messages are lifted out of the conversation (joined if several).
    fn build_request(&self, request: CompletionRequest) -> AnthropicRequest {
        let model = request
            .model
            .unwrap_or_else(|| self.default_model().to_string());

        let mut system_parts = Vec::new();
        let mut messages = Vec::new();
        for msg in request.messages {
            match msg.role {
                Role::System => system_parts.push(msg.content),
                Role::User | Role::Assistant => messages.push(AnthropicMessage {
                    role: msg.role.as_str().into(),
                    content: msg.content,
                }),
            }
        }

        AnthropicRequest {
            model,
            messages,
            system: if system_parts.is_empty() {
                None
            } else {
                Some(system_parts.join("\n\n"))
            },
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: request.temperature.map(|t| t.min(1.0)),
        }
    }
}

impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    async fn complete(&self, request: CompletionRequest) -> std::result::Result<CompletionResponse, ProviderError> {
        let api_request = self.build_request(request);
        debug!(
            provider = "anthropic",
            model = %api_request.model,
            messages = api_request.messages.len(),
            "sending messages request"
        );

        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or(ProviderError::AuthenticationFailed)?;

        let mut req = self
            .client
            .post(format!("{}/messages", self.base_url()))
            .header("x-api-key", api_key)
            .header("content-type", "application/json")
            .json(&api_request);

        if !self.config.headers.contains_key("anthropic-version") {
            req = req.header("anthropic-version", ANTHROPIC_VERSION);
        }
        for (key, value) in &self.config.headers {
            req = req.header(key, value);
        }

        let response = req
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after_secs(response.headers());
            let text = response.text().await.unwrap_or_default();
            warn!(provider = "anthropic", status = status.as_u16(), "messages request rejected");
            return Err(status_error(status.as_u16(), retry_after, &text));
        }

        let api_response: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(into_completion(api_response))
    }
}

fn into_completion(api_response: AnthropicResponse) -> CompletionResponse {
    let content: String = api_response
        .content
        .iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            ContentBlock::Other => None,
        })
        .collect();

    let finish_reason = match api_response.stop_reason.as_deref() {
        Some("end_turn") | Some("stop_sequence") => FinishReason::Stop,
        Some("max_tokens") => FinishReason::Length,
        _ => FinishReason::Unknown,
    };

    let usage = Usage {
        prompt_tokens: api_response.usage.input_tokens,
        completion_tokens: api_response.usage.output_tokens,
        total_tokens: api_response.usage.input_tokens + api_response.usage.output_tokens,
    };

    CompletionResponse {
        id: api_response.id,
        model: api_response.model,
        content: if content.is_empty() { None } else { Some(content) },
        finish_reason,
        usage,
    }
}

// ============================================================================
// Anthropic API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    model: String,
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    usage: AnthropicUsage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: usize,
    output_tokens: usize,
}
