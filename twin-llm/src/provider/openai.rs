//! OpenAI-compatible provider implementation
//!
//! Works with OpenAI, Azure OpenAI, vLLM, Ollama, and other OpenAI-compatible APIs.

use super::*;
use crate::error::Error;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// OpenAI-compatible provider
#[derive(Debug)]
pub struct OpenAIProvider {
    client: Client,
    config: ProviderConfig,
}

impl OpenAIProvider {
    /// Create the client. Fails with `ConfigMissing` when the endpoint needs
    /// an API key and none is configured.
    pub fn new(config: ProviderConfig) -> Result<Self> {
        config.require_credential()?;

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                Error::unexpected("failed to create HTTP client")
                    .with_operation("openai::new")
                    .set_source(e)
            })?;

        Ok(Self { client, config })
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn build_request(&self, request: CompletionRequest) -> OpenAIRequest {
        let model = request
            .model
            .unwrap_or_else(|| self.default_model().to_string());

        OpenAIRequest {
            model,
            messages: request.messages.into_iter().map(OpenAIMessage::from).collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: Some(false),
        }
    }
}

impl LlmProvider for OpenAIProvider {
    fn name(&self) -> &str {
        self.config.provider_type.prefix()
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    async fn complete(&self, request: CompletionRequest) -> std::result::Result<CompletionResponse, ProviderError> {
        let api_request = self.build_request(request);
        debug!(
            provider = self.name(),
            model = %api_request.model,
            messages = api_request.messages.len(),
            "sending chat completion request"
        );

        let mut req = self
            .client
            .post(format!("{}/chat/completions", self.base_url()))
            .json(&api_request);

        if let Some(api_key) = &self.config.api_key {
            if !api_key.is_empty() {
                req = req.header("Authorization", format!("Bearer {}", api_key));
            }
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
            warn!(provider = self.name(), status = status.as_u16(), "completion request rejected");
            return Err(status_error(status.as_u16(), retry_after, &text));
        }

        let api_response: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        into_completion(api_response)
    }
}

fn into_completion(api_response: OpenAIResponse) -> std::result::Result<CompletionResponse, ProviderError> {
    let choice = api_response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Parse("no choices in response".into()))?;

    let finish_reason = match choice.finish_reason.as_deref() {
        Some("stop") => FinishReason::Stop,
        Some("length") => FinishReason::Length,
        Some("content_filter") => FinishReason::ContentFilter,
        _ => FinishReason::Unknown,
    };

    let usage = api_response
        .usage
        .map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        })
        .unwrap_or_default();

    Ok(CompletionResponse {
        id: api_response.id,
        model: api_response.model,
        content: choice.message.content,
        finish_reason,
        usage,
    })
}

// ============================================================================
// OpenAI API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

impl From<ChatMessage> for OpenAIMessage {
    fn from(msg: ChatMessage) -> Self {
        Self {
            role: msg.role.as_str().into(),
            content: Some(msg.content),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    model: String,
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
    total_tokens: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> OpenAIProvider {
        OpenAIProvider::new(ProviderConfig::openai("sk-test")).unwrap()
    }

    #[test]
    fn test_request_body() {
        let request = CompletionRequest::new(vec![
            ChatMessage::system("You are a twin."),
            ChatMessage::user("Who am I?"),
        ])
        .with_sampling(&SamplingConfig::default());

        let body = serde_json::to_value(provider().build_request(request)).unwrap();

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Who am I?");
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert_eq!(body["stream"], false);
        assert!(body.get("max_tokens").is_none());
        assert!(body.get("stop").is_none());
    }

    #[test]
    fn test_request_model_override() {
        let request = CompletionRequest::new(vec![ChatMessage::user("hi")]).with_model("gpt-4o");
        let body = serde_json::to_value(provider().build_request(request)).unwrap();
        assert_eq!(body["model"], "gpt-4o");
    }

    #[test]
    fn test_parse_response() {
        let raw = r#"{
            "id": "chatcmpl-1",
            "model": "gpt-4o-mini-2024-07-18",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "You love chess."},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 120, "completion_tokens": 5, "total_tokens": 125}
        }"#;
        let parsed: OpenAIResponse = serde_json::from_str(raw).unwrap();
        let response = into_completion(parsed).unwrap();

        assert_eq!(response.id, "chatcmpl-1");
        assert_eq!(response.text(), Some("You love chess."));
        assert_eq!(response.finish_reason, FinishReason::Stop);
        assert_eq!(response.usage.total_tokens, 125);
    }

    #[test]
    fn test_parse_response_without_choices() {
        let parsed: OpenAIResponse =
            serde_json::from_str(r#"{"id": "x", "model": "m", "choices": []}"#).unwrap();
        assert!(matches!(into_completion(parsed), Err(ProviderError::Parse(_))));
    }

    #[test]
    fn test_parse_response_null_content() {
        let raw = r#"{"choices": [{"message": {"role": "assistant", "content": null}, "finish_reason": "length"}]}"#;
        let parsed: OpenAIResponse = serde_json::from_str(raw).unwrap();
        let response = into_completion(parsed).unwrap();

        assert_eq!(response.content, None);
        assert_eq!(response.finish_reason, FinishReason::Length);
        assert_eq!(response.usage, Usage::default());
    }

    #[test]
    fn test_missing_key_fails_construction() {
        let mut config = ProviderConfig::openai("x");
        config.api_key = None;
        let err = OpenAIProvider::new(config).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::ConfigMissing);
    }
}
