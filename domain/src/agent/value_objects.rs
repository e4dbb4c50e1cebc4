//! Agent value objects
//!
//! - [`AgentId`] - The declared identity an agent speaks under

use serde::{Deserialize, Serialize};

/// Identity of a configured agent.
///
/// This is the name other participants see in the transcript and the
/// label the impersonation check guards. Comparisons between identities
/// supplied by users or models go through [`AgentId::matches`], which
/// ignores case and surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    /// Creates an AgentId from an existing string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against a free-form name.
    pub fn matches(&self, name: &str) -> bool {
        self.0.trim().eq_ignore_ascii_case(name.trim())
    }
}

impl<T: Into<String>> From<T> for AgentId {
    fn from(s: T) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_id_matches_ignores_case() {
        let id = AgentId::new("Reviewer");
        assert!(id.matches("reviewer"));
        assert!(id.matches("  REVIEWER "));
        assert!(!id.matches("reviewer2"));
    }

    #[test]
    fn test_agent_id_serializes_transparently() {
        let id = AgentId::new("agent1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"agent1\"");
    }
}
