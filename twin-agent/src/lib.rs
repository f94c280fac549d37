//! # Agent Twin
//!
//! A single agent answering questions about its owner:
//! 1. An `AgentProfile` says who the agent is (role, goal, persona)
//! 2. A `TaskTemplate` says what to do, with `{placeholders}` for inputs
//! 3. The `Invoker` checks every placeholder is bound, renders the prompt
//!    and sends it to the model once
//! 4. The answer comes back as an `InvocationResult`
//!
//! `AgentTwin` bundles the three for the common "ask one question" case.

mod console;
mod invoker;
mod profile;
mod task;
mod template;
mod twin;

pub use console::{write_answer, write_header, RULE_WIDTH};
pub use invoker::{InvocationRequest, InvocationResult, Invoker, RenderedPrompt};
pub use profile::AgentProfile;
pub use task::{Bindings, TaskTemplate, QUESTION_KEY};
pub use template::{placeholders, render};
pub use twin::{AgentTwin, DEFAULT_QUESTION};
