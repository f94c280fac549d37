//! Mock provider for tests and offline runs.
//!
//! Never touches the network. Counts calls and remembers the last request
//! so tests can check what would have been sent.

use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug)]
enum Behavior {
    /// Return these responses in order, cycling
    Sequence(Vec<String>),
    /// Return every message content joined by blank lines
    Echo,
    /// Fail every call with this error
    Fail(ProviderError),
}

/// A provider that answers from memory.
///
/// # Example
///
/// ```rust,ignore
/// let model = MockProvider::sequence(["Hello!", "Goodbye!"]);
/// // First call returns "Hello!", second "Goodbye!", third "Hello!" again...
/// ```
#[derive(Debug)]
pub struct MockProvider {
    model_id: String,
    behavior: Behavior,
    calls: AtomicUsize,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl MockProvider {
    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            model_id: "mock-model".to_string(),
            behavior,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Always answer with `text`
    pub fn fixed(text: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Sequence(vec![text.into()]))
    }

    /// Answer with `responses` in turn, starting over after the last one.
    /// An empty list yields responses without content.
    pub fn sequence<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_behavior(Behavior::Sequence(
            responses.into_iter().map(Into::into).collect(),
        ))
    }

    /// Answer with the prompt itself
    pub fn echo() -> Self {
        Self::with_behavior(Behavior::Echo)
    }

    /// Fail every call with `error`
    pub fn failing(error: ProviderError) -> Self {
        Self::with_behavior(Behavior::Fail(error))
    }

    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Number of `complete` calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent request, if any
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request.lock().ok().and_then(|slot| slot.clone())
    }
}

impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn default_model(&self) -> &str {
        &self.model_id
    }

    async fn complete(&self, request: CompletionRequest) -> std::result::Result<CompletionResponse, ProviderError> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut slot) = self.last_request.lock() {
            *slot = Some(request.clone());
        }

        let content = match &self.behavior {
            Behavior::Sequence(responses) if responses.is_empty() => None,
            Behavior::Sequence(responses) => Some(responses[index % responses.len()].clone()),
            Behavior::Echo => Some(
                request
                    .messages
                    .iter()
                    .map(|m| m.content.as_str())
                    .collect::<Vec<_>>()
                    .join("\n\n"),
            ),
            Behavior::Fail(err) => return Err(err.clone()),
        };

        Ok(CompletionResponse {
            id: format!("mock-{}", index),
            model: request.model.unwrap_or_else(|| self.model_id.clone()),
            content,
            finish_reason: FinishReason::Stop,
            usage: Usage::default(),
        })
    }
}
