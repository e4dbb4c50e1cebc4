//! Agent invocation port
//!
//! Defines how the driver reaches an agent. The request carries everything
//! the agent may see: its profile, the full shared history, its system
//! prompt and the instruction for this turn. Adapters decide how to turn
//! that into a model call.

use async_trait::async_trait;
use roundtable_domain::{AgentProfile, Message, PromptTemplate, TokenUsage, ValidationResult};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Why the agent is being asked to speak
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPurpose {
    Discussion,
    Vote,
    FinalAnswer,
}

impl TurnPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnPurpose::Discussion => "discussion",
            TurnPurpose::Vote => "vote",
            TurnPurpose::FinalAnswer => "final_answer",
        }
    }
}

impl fmt::Display for TurnPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One turn's worth of input for an agent
#[derive(Debug, Clone, Copy)]
pub struct AgentRequest<'a> {
    pub agent: &'a AgentProfile,
    pub history: &'a [Message],
    pub system_prompt: &'a str,
    pub instruction: &'a str,
    /// Set when a previous attempt at this turn was rejected
    pub retry_notice: Option<&'a str>,
    pub purpose: TurnPurpose,
}

impl AgentRequest<'_> {
    /// Render the request as a single plain-text prompt
    pub fn render(&self) -> String {
        PromptTemplate::render_request(
            self.system_prompt,
            self.history,
            self.instruction,
            self.retry_notice,
        )
    }
}

/// What an agent said
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentReply {
    pub text: String,
    /// Reported usage, when the adapter knows it
    pub usage: Option<TokenUsage>,
}

impl AgentReply {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: None,
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }
}

/// Errors that can occur while invoking an agent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvocationError {
    #[error("Invocation failed: {0}")]
    Failed(String),

    #[error("Timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Agent unavailable: {0}")]
    Unavailable(String),
}

/// Why a single attempt at a turn did not produce a message
#[derive(Debug, Clone, PartialEq)]
pub enum TurnFailure {
    /// The agent answered but the reply failed validation
    Rejected(ValidationResult),
    /// The agent could not be reached
    Invocation(InvocationError),
}

impl TurnFailure {
    /// Short name of the failure kind, for logs and errors
    pub fn kind_name(&self) -> &'static str {
        match self {
            TurnFailure::Rejected(result) => result
                .primary()
                .map(|v| v.kind_name())
                .unwrap_or("ValidationFailure"),
            TurnFailure::Invocation(_) => "InvocationError",
        }
    }
}

impl fmt::Display for TurnFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnFailure::Rejected(result) => write!(f, "{}", result),
            TurnFailure::Invocation(e) => write!(f, "{}", e),
        }
    }
}

/// Port for reaching the agents
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait AgentInvoker: Send + Sync {
    async fn invoke(&self, request: &AgentRequest<'_>) -> Result<AgentReply, InvocationError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_domain::Violation;

    #[test]
    fn test_render_includes_instruction() {
        let agent = AgentProfile::new("agent1", "role");
        let history = vec![Message::user("Q", 0, 0)];
        let request = AgentRequest {
            agent: &agent,
            history: &history,
            system_prompt: "sys",
            instruction: "speak",
            retry_notice: None,
            purpose: TurnPurpose::Discussion,
        };
        let text = request.render();
        assert!(text.contains("[User]\nQ"));
        assert!(text.ends_with("### Instruction\nspeak\n"));
    }

    #[test]
    fn test_failure_kind_name() {
        let rejected = TurnFailure::Rejected(ValidationResult::from_violations(vec![
            Violation::EmptyContent,
        ]));
        assert_eq!(rejected.kind_name(), "EmptyContentViolation");

        let failed = TurnFailure::Invocation(InvocationError::Timeout(Duration::from_secs(3)));
        assert_eq!(failed.kind_name(), "InvocationError");
        assert_eq!(failed.to_string(), "Timed out after 3s");
    }
}
