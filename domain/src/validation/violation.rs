//! Validation outcomes

use serde::{Deserialize, Serialize};
use std::fmt;

/// A reason to reject a candidate message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// A line was written in another participant's name
    Impersonation { impersonated: String },
    /// A required part of the phase's format is missing
    Format { missing: Vec<String> },
    /// Nothing but whitespace
    EmptyContent,
}

impl Violation {
    /// Stable name used in logs and error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Violation::Impersonation { .. } => "ImpersonationViolation",
            Violation::Format { .. } => "FormatViolation",
            Violation::EmptyContent => "EmptyContentViolation",
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Impersonation { impersonated } => {
                write!(f, "{}: spoke as '{}'", self.kind_name(), impersonated)
            }
            Violation::Format { missing } => {
                write!(f, "{}: missing {}", self.kind_name(), missing.join(", "))
            }
            Violation::EmptyContent => write!(f, "{}: empty message", self.kind_name()),
        }
    }
}

/// Verdict on one candidate message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub accepted: bool,
    pub violations: Vec<Violation>,
}

impl ValidationResult {
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        Self {
            accepted: violations.is_empty(),
            violations,
        }
    }

    /// The first violation found, used as the headline in logs
    pub fn primary(&self) -> Option<&Violation> {
        self.violations.first()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.accepted {
            return write!(f, "accepted");
        }
        let parts: Vec<String> = self.violations.iter().map(|v| v.to_string()).collect();
        write!(f, "{}", parts.join("; "))
    }
}
