//! What the agent is asked to do

use crate::template;
use std::collections::HashMap;

/// Placeholder name → value
pub type Bindings = HashMap<String, String>;

/// Name of the placeholder the default task expects
pub const QUESTION_KEY: &str = "question";

/// A task description with `{placeholders}` and a hint about the answer.
///
/// Both fields may contain placeholders; all of them must be bound when
/// the task is run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskTemplate {
    description: String,
    expected_output: String,
}

impl TaskTemplate {
    pub fn new(description: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            expected_output: expected_output.into(),
        }
    }

    /// Answer one `{question}` about the owner from the persona
    pub fn answer_question() -> Self {
        Self::new(
            "Answer the following question about me: {question}

Use the information from your backstory to provide an accurate,
friendly, and helpful response. If you don't know something,
say so honestly rather than making it up.",
            "A clear, friendly answer to the question about me",
        )
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn expected_output(&self) -> &str {
        &self.expected_output
    }

    /// Every placeholder across description and expected output, each once
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names = template::placeholders(&self.description);
        for name in template::placeholders(&self.expected_output) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Placeholders with no value in `bindings`
    pub fn unbound(&self, bindings: &Bindings) -> Vec<&str> {
        self.placeholders()
            .into_iter()
            .filter(|name| !bindings.contains_key(*name))
            .collect()
    }
}

impl Default for TaskTemplate {
    fn default() -> Self {
        Self::answer_question()
    }
}
