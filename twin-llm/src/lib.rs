//! # twin-llm
//!
//! The model client half of the agent twin.
//!
//! ## Core Concepts
//! - **Provider**: Trait-based LLM communication (OpenAI, Anthropic, Ollama, mock)
//! - **ModelSpec**: `provider/model` strings such as `openai/gpt-4o-mini`
//! - **Settings**: Model, sampling and timeout read from the environment
//! - **ProviderConfig**: Endpoint and credential for one provider
//!
//! A provider sends one request per call and never retries; failures are
//! reported as [`ProviderError`] and converted to [`twin_error::Error`] at the
//! crate boundary.

pub mod config;
pub mod error;
pub mod provider;

pub use config::{
    ModelSettings, ModelSpec, ProviderConfig, ProviderType, SamplingConfig, DEFAULT_MODEL,
    DEFAULT_TEMPERATURE,
};
pub use error::{Error, ErrorKind, ErrorStatus, ProviderError, Result};
pub use provider::{
    AnthropicProvider, ChatMessage, CompletionRequest, CompletionResponse, FinishReason,
    HostedProvider, LlmProvider, MockProvider, OpenAIProvider, Role, Usage,
};
