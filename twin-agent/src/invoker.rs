//! Invoker - validates, renders and sends one task to the model

use crate::profile::AgentProfile;
use crate::task::{Bindings, TaskTemplate};
use crate::template;
use std::fmt;
use tracing::{debug, info};
use twin_error::{Error, Result};
use twin_llm::{
    ChatMessage, CompletionRequest, LlmProvider, ProviderError, SamplingConfig, Usage,
};

/// One run of one task by one agent. Built per call, never stored.
#[derive(Debug, Clone, Copy)]
pub struct InvocationRequest<'a> {
    pub profile: &'a AgentProfile,
    pub task: &'a TaskTemplate,
    pub bindings: &'a Bindings,
}

/// The two messages sent to the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    pub system: String,
    pub user: String,
}

impl RenderedPrompt {
    pub fn into_messages(self) -> Vec<ChatMessage> {
        vec![ChatMessage::system(self.system), ChatMessage::user(self.user)]
    }
}

impl<'a> InvocationRequest<'a> {
    pub fn new(profile: &'a AgentProfile, task: &'a TaskTemplate, bindings: &'a Bindings) -> Self {
        Self {
            profile,
            task,
            bindings,
        }
    }

    /// Check every placeholder is bound, then build the prompt.
    ///
    /// The profile becomes the system message; the task description and the
    /// expected output hint become the user message.
    pub fn render(&self) -> Result<RenderedPrompt> {
        let missing = self.task.unbound(self.bindings);
        if !missing.is_empty() {
            return Err(Error::missing_parameters(missing).with_operation("invocation::render"));
        }

        let wanted = self.task.placeholders();
        let ignored: Vec<&str> = self
            .bindings
            .keys()
            .map(String::as_str)
            .filter(|key| !wanted.contains(key))
            .collect();
        if !ignored.is_empty() {
            debug!(?ignored, "bindings not referenced by the task");
        }

        let description = template::render(self.task.description(), self.bindings)?;
        let expected_output = template::render(self.task.expected_output(), self.bindings)?;

        let system = format!(
            "You are {}. {}\nYour personal goal is: {}",
            self.profile.role().trim(),
            self.profile.persona().trim(),
            self.profile.goal().trim(),
        );

        let mut user = format!("Current Task: {}", description.trim());
        if !expected_output.trim().is_empty() {
            user.push_str(&format!(
                "\n\nThis is the expected criteria for your final answer: {}\n\
                 You MUST return the actual complete content as the final answer, not a summary.",
                expected_output.trim()
            ));
        }

        Ok(RenderedPrompt { system, user })
    }
}

/// What the agent answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResult {
    pub text: String,
    /// Model that produced the answer, as reported by the provider
    pub model: String,
    pub usage: Usage,
}

impl fmt::Display for InvocationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Sends tasks to a model on behalf of an agent.
///
/// The provider is handed in at construction so tests can substitute a
/// [`twin_llm::MockProvider`]. The invoker holds no per-call state: running
/// the same inputs twice against a deterministic provider gives the same
/// answer.
#[derive(Debug)]
pub struct Invoker<P> {
    provider: P,
    sampling: SamplingConfig,
    model: Option<String>,
}

impl<P: LlmProvider> Invoker<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            sampling: SamplingConfig::default(),
            model: None,
        }
    }

    pub fn with_sampling(mut self, sampling: SamplingConfig) -> Self {
        self.sampling = sampling;
        self
    }

    /// Ask for `model` instead of the provider's default
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn sampling(&self) -> &SamplingConfig {
        &self.sampling
    }

    /// Run `task` as `profile` with `bindings`.
    ///
    /// Fails with `MissingParameter` before contacting the model if any
    /// placeholder is unbound. Provider failures come back with an upstream
    /// [`twin_error::ErrorKind`]. Nothing is retried.
    pub async fn run(
        &self,
        profile: &AgentProfile,
        task: &TaskTemplate,
        bindings: &Bindings,
    ) -> Result<InvocationResult> {
        self.dispatch(InvocationRequest::new(profile, task, bindings))
            .await
    }

    /// Send an already assembled request
    pub async fn dispatch(&self, request: InvocationRequest<'_>) -> Result<InvocationResult> {
        let prompt = request
            .render()
            .map_err(|e| e.with_operation("invoker::run"))?;

        debug!(
            role = request.profile.role(),
            system_chars = prompt.system.len(),
            user_chars = prompt.user.len(),
            "rendered prompt"
        );

        let mut completion = CompletionRequest::new(prompt.into_messages()).with_sampling(&self.sampling);
        if let Some(model) = &self.model {
            completion = completion.with_model(model.clone());
        }

        let provider = self.provider.name();
        info!(
            provider,
            model = completion.model.as_deref().unwrap_or(self.provider.default_model()),
            "asking the model"
        );

        let response = self
            .provider
            .complete(completion)
            .await
            .map_err(|e| e.into_error(provider, "invoker::run"))?;

        let text = response
            .text()
            .map(|t| t.trim().to_string())
            .ok_or_else(|| ProviderError::EmptyResponse.into_error(provider, "invoker::run"))?;

        info!(
            model = %response.model,
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            "agent answered"
        );

        Ok(InvocationResult {
            text,
            model: response.model,
            usage: response.usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::QUESTION_KEY;
    use twin_error::ErrorKind;
    use twin_llm::{MockProvider, Role};

    fn xyz() -> AgentProfile {
        AgentProfile::new("X", "Y", "Z")
    }

    fn question(q: &str) -> Bindings {
        let mut bindings = Bindings::new();
        bindings.insert(QUESTION_KEY.into(), q.into());
        bindings
    }

    #[test]
    fn test_render_places_profile_in_system_message() {
        let profile = xyz();
        let task = TaskTemplate::new("Answer: {question}", "Short answer");
        let bindings = question("Q");

        let prompt = InvocationRequest::new(&profile, &task, &bindings).render().unwrap();

        assert_eq!(prompt.system, "You are X. Z\nYour personal goal is: Y");
        assert!(prompt.user.starts_with("Current Task: Answer: Q"));
        assert!(prompt.user.contains("expected criteria for your final answer: Short answer"));

        let messages = prompt.into_messages();
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].role, Role::User);
    }

    #[test]
    fn test_render_without_expected_output() {
        let profile = xyz();
        let task = TaskTemplate::new("Say hi", "");
        let bindings = Bindings::new();

        let prompt = InvocationRequest::new(&profile, &task, &bindings).render().unwrap();
        assert_eq!(prompt.user, "Current Task: Say hi");
    }

    #[test]
    fn test_render_checks_expected_output_too() {
        let profile = xyz();
        let task = TaskTemplate::new("Answer {question}", "In {language}");

        let err = InvocationRequest::new(&profile, &task, &question("Q"))
            .render()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingParameter);
        assert_eq!(err.context_value("placeholder"), Some("language"));
    }

    #[tokio::test]
    async fn test_bound_template_never_misses_parameters() {
        let invoker = Invoker::new(MockProvider::fixed("ok"));
        let profile = xyz();
        let tasks = [
            TaskTemplate::answer_question(),
            TaskTemplate::new("{question}{question}", "{question}"),
            TaskTemplate::new("no placeholders", "none here"),
        ];

        for task in &tasks {
            let result = invoker.run(&profile, task, &question("Q")).await;
            assert!(result.is_ok(), "{:?}", result.err());
        }
        assert_eq!(invoker.provider().calls(), tasks.len());
    }

    #[tokio::test]
    async fn test_missing_parameter_skips_the_model() {
        let invoker = Invoker::new(MockProvider::echo());
        let task = TaskTemplate::answer_question();

        let err = invoker
            .run(&xyz(), &task, &Bindings::new())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::MissingParameter);
        assert_eq!(err.operation(), "invoker::run");
        assert_eq!(invoker.provider().calls(), 0);

        let mut wrong = Bindings::new();
        wrong.insert("questions".into(), "Q".into());
        let err = invoker.run(&xyz(), &task, &wrong).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingParameter);
        assert_eq!(invoker.provider().calls(), 0);
    }

    #[tokio::test]
    async fn test_echo_contains_question() {
        let invoker = Invoker::new(MockProvider::echo());
        let result = invoker
            .run(&xyz(), &TaskTemplate::answer_question(), &question("Q"))
            .await
            .unwrap();

        assert!(result.text.contains('Q'));
        assert!(result.text.contains("You are X. Z"));
        assert_eq!(result.model, "mock-model");
    }

    #[tokio::test]
    async fn test_runs_are_repeatable() {
        let profile = xyz();
        let task = TaskTemplate::answer_question();
        let bindings = question("What are my hobbies?");

        for provider in [MockProvider::echo(), MockProvider::fixed("Chess.")] {
            let invoker = Invoker::new(provider);
            let first = invoker.run(&profile, &task, &bindings).await.unwrap();
            let second = invoker.run(&profile, &task, &bindings).await.unwrap();
            assert_eq!(first.text, second.text);
        }
    }

    #[tokio::test]
    async fn test_sampling_and_model_reach_the_provider() {
        let sampling = SamplingConfig::default()
            .with_temperature(0.2)
            .unwrap()
            .with_max_tokens(256);
        let invoker = Invoker::new(MockProvider::fixed("ok"))
            .with_sampling(sampling)
            .with_model("gpt-4o");

        invoker
            .run(&xyz(), &TaskTemplate::answer_question(), &question("Q"))
            .await
            .unwrap();

        let request = invoker.provider().last_request().unwrap();
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.max_tokens, Some(256));
        assert_eq!(request.model.as_deref(), Some("gpt-4o"));
        assert_eq!(request.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_upstream_errors_propagate() {
        let invoker = Invoker::new(MockProvider::failing(ProviderError::RateLimited {
            retry_after: Some(30),
        }));

        let err = invoker
            .run(&xyz(), &TaskTemplate::answer_question(), &question("Q"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::RateLimited);
        assert!(err.kind().is_upstream());
        assert_eq!(err.context_value("provider"), Some("mock"));
        assert_eq!(invoker.provider().calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_answer_is_upstream_error() {
        let invoker = Invoker::new(MockProvider::fixed("   "));
        let err = invoker
            .run(&xyz(), &TaskTemplate::answer_question(), &question("Q"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InferenceFailed);
    }

    #[tokio::test]
    async fn test_answer_is_trimmed_and_displayed() {
        let invoker = Invoker::new(MockProvider::fixed("\n  You enjoy hiking.  \n"));
        let result = invoker
            .run(&xyz(), &TaskTemplate::answer_question(), &question("Q"))
            .await
            .unwrap();

        assert_eq!(result.to_string(), "You enjoy hiking.");
    }
}
