//! The personal agent twin: one profile, one task, one invoker

use crate::invoker::{InvocationResult, Invoker};
use crate::profile::AgentProfile;
use crate::task::{Bindings, TaskTemplate, QUESTION_KEY};
use tracing::info;
use twin_error::Result;
use twin_llm::LlmProvider;

/// Asked when the user gives no question
pub const DEFAULT_QUESTION: &str = "What are my interests and what am I learning?";

/// An agent that answers questions about its owner.
///
/// ```no_run
/// # async fn demo() -> twin_error::Result<()> {
/// use twin_agent::AgentTwin;
/// use twin_llm::{HostedProvider, ModelSettings, ProviderConfig};
///
/// let settings = ModelSettings::from_env()?;
/// let provider = HostedProvider::connect(ProviderConfig::from_env(&settings)?)?;
/// let twin = AgentTwin::with_defaults(provider);
/// println!("{}", twin.ask("Where am I from?").await?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct AgentTwin<P> {
    profile: AgentProfile,
    task: TaskTemplate,
    invoker: Invoker<P>,
}

impl<P: LlmProvider> AgentTwin<P> {
    pub fn new(profile: AgentProfile, task: TaskTemplate, invoker: Invoker<P>) -> Self {
        Self {
            profile,
            task,
            invoker,
        }
    }

    /// Built-in profile and question-answering task
    pub fn with_defaults(provider: P) -> Self {
        Self::new(
            AgentProfile::default(),
            TaskTemplate::default(),
            Invoker::new(provider),
        )
    }

    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    pub fn task(&self) -> &TaskTemplate {
        &self.task
    }

    pub fn invoker(&self) -> &Invoker<P> {
        &self.invoker
    }

    /// Run the task with arbitrary bindings
    pub async fn kickoff(&self, bindings: &Bindings) -> Result<InvocationResult> {
        self.invoker.run(&self.profile, &self.task, bindings).await
    }

    /// Bind `question` and run the task
    pub async fn ask(&self, question: &str) -> Result<InvocationResult> {
        info!(role = self.profile.role(), "answering question");
        let mut bindings = Bindings::new();
        bindings.insert(QUESTION_KEY.to_string(), question.to_string());
        self.kickoff(&bindings).await
    }
}
