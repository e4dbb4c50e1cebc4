//! Structured configuration issues.
//!
//! Configuration is checked as a whole before a run starts. Each problem is
//! reported as a [`ConfigIssue`] so the caller can print every finding at
//! once and refuse to start only when an [`Severity::Error`] is present.

use std::fmt;

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// Fewer than two agents configured.
    TooFewAgents,
    /// Two agents share a name (case-insensitive).
    DuplicateAgent,
    /// Empty name, or a name containing ':' or a line break.
    InvalidAgentName,
    /// Temperature outside 0.0..=2.0.
    TemperatureOutOfRange,
    /// An agent has no role prompt.
    EmptyRolePrompt,
    /// An agent has no command and there is no default command.
    MissingCommand,
    /// The chair does not name a configured agent.
    UnknownChair,
    /// `max_iterations` is zero.
    ZeroIterations,
    /// `max_cycles` is zero, so the run would stop before any agent speaks.
    ZeroCycles,
    /// The cycle limit stops the run before the phase threshold can trigger a vote.
    UnreachableConsensus,
    /// So many abstentions are allowed that one approval can carry a vote.
    PermissiveAbstentions,
    /// The final answer has no required sections.
    EmptyFinalAnswerSchema,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", level, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let issue = ConfigIssue::error(ConfigIssueCode::TooFewAgents, "need two agents");
        assert!(issue.is_error());
        assert_eq!(issue.to_string(), "error: need two agents");

        let issue = ConfigIssue::warning(ConfigIssueCode::EmptyRolePrompt, "agent1 has no role");
        assert!(!issue.is_error());
        assert_eq!(issue.to_string(), "warning: agent1 has no role");
    }
}
