//! Who the agent is

use serde::{Deserialize, Serialize};
use std::path::Path;
use twin_error::{Error, ErrorKind, Result};

/// Role, goal and persona of the agent.
///
/// The persona is free text describing the owner; it is sent to the model
/// as-is and is never interpreted locally. Profiles are immutable once built.
///
/// Profiles load from JSON; `backstory` is accepted in place of `persona`:
///
/// ```json
/// { "role": "Personal Digital Twin", "goal": "Answer questions about me", "backstory": "..." }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    role: String,
    goal: String,
    #[serde(alias = "backstory")]
    persona: String,
}

impl AgentProfile {
    pub fn new(role: impl Into<String>, goal: impl Into<String>, persona: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            goal: goal.into(),
            persona: persona.into(),
        }
    }

    /// The built-in profile: an MBA student learning to build AI agents.
    /// Replace it with `--profile` to make the twin your own.
    pub fn digital_twin() -> Self {
        Self::new(
            "Personal Digital Twin",
            "Answer questions about me accurately and helpfully",
            "You are the digital twin of a MIT MBA student learning AI and CrewAI.

Here's what you know about me:
- I'm studying for an MBA at MIT with a focus on AI applications.
- I'm learning how to build AI agents using CrewAI.
- I'm passionate about technology, entrepreneurship, and innovation.
- My favorite hobbies include coding, playing chess, and cooking.
- I'm interested in AI, machine learning, and data science.
- I have experience with Machine Learning and Artificial Intelligence projects.
- I'm currently working on my startup idea.
- I am from Brazil and I love to travel and explore new cultures.
- In my free time, I like reading sci-fi novels and hiking.

When someone asks about me, you provide friendly, accurate information
based on what I've told you about myself. You're helpful, enthusiastic,
and represent me well in conversations.",
        )
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn persona(&self) -> &str {
        &self.persona
    }

    /// Parse a profile from JSON. Every field must be non-blank.
    pub fn from_json(json: &str) -> Result<Self> {
        let profile: Self = serde_json::from_str(json).map_err(|e| {
            Error::parse_failed(format!("invalid profile JSON: {}", e))
                .with_operation("profile::from_json")
                .set_source(e)
        })?;
        profile.validate()?;
        Ok(profile)
    }

    /// Read a profile from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::from(e).with_context("path", display.clone()))?;
        Self::from_json(&json).map_err(|e| e.with_operation("profile::load").with_context("path", display))
    }

    fn validate(&self) -> Result<()> {
        for (field, value) in [("role", &self.role), ("goal", &self.goal), ("persona", &self.persona)] {
            if value.trim().is_empty() {
                return Err(Error::new(ErrorKind::ConfigInvalid, format!("profile {} is empty", field))
                    .with_operation("profile::validate")
                    .with_context("field", field));
            }
        }
        Ok(())
    }
}

impl Default for AgentProfile {
    fn default() -> Self {
        Self::digital_twin()
    }
}
