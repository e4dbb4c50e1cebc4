//! Conversation messages

use crate::agent::AgentId;
use serde::{Deserialize, Serialize};

/// Label the human reviewer speaks under.
pub const HUMAN_LABEL: &str = "Human";

/// Label of the original requester.
pub const USER_LABEL: &str = "User";

/// Author of a message
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The opening query
    User,
    /// A configured agent
    Agent(AgentId),
    /// Feedback given at a checkpoint
    Human,
}

impl Role {
    /// Label used when rendering the transcript
    pub fn label(&self) -> &str {
        match self {
            Role::User => USER_LABEL,
            Role::Agent(id) => id.as_str(),
            Role::Human => HUMAN_LABEL,
        }
    }

    pub fn is_agent(&self) -> bool {
        matches!(self, Role::Agent(_))
    }

    /// The agent identity, if this role is an agent
    pub fn agent(&self) -> Option<&AgentId> {
        match self {
            Role::Agent(id) => Some(id),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A single utterance in the shared conversation (Entity)
///
/// Messages are immutable once appended to the
/// [`MessageStore`](super::store::MessageStore). `cycle` is the number of
/// completed feedback cycles when the message was written; `sequence` is
/// its zero-based position in the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub cycle: u32,
    pub sequence: usize,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>, cycle: u32, sequence: usize) -> Self {
        Self {
            role,
            content: content.into(),
            cycle,
            sequence,
        }
    }

    pub fn user(content: impl Into<String>, cycle: u32, sequence: usize) -> Self {
        Self::new(Role::User, content, cycle, sequence)
    }

    pub fn agent(
        id: impl Into<AgentId>,
        content: impl Into<String>,
        cycle: u32,
        sequence: usize,
    ) -> Self {
        Self::new(Role::Agent(id.into()), content, cycle, sequence)
    }

    pub fn human(content: impl Into<String>, cycle: u32, sequence: usize) -> Self {
        Self::new(Role::Human, content, cycle, sequence)
    }

    /// Name of whoever wrote this message
    pub fn speaker(&self) -> &str {
        self.role.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_labels() {
        assert_eq!(Role::User.label(), "User");
        assert_eq!(Role::Human.label(), "Human");
        assert_eq!(Role::Agent(AgentId::new("agent1")).label(), "agent1");
    }

    #[test]
    fn test_message_constructors() {
        let m = Message::agent("A", "hello", 2, 7);
        assert_eq!(m.speaker(), "A");
        assert_eq!(m.cycle, 2);
        assert_eq!(m.sequence, 7);
        assert!(m.role.is_agent());
        assert_eq!(m.role.agent().map(|a| a.as_str()), Some("A"));
        assert!(Message::human("h", 0, 1).role.agent().is_none());
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&Role::Agent(AgentId::new("B"))).unwrap();
        assert_eq!(json, r#"{"agent":"B"}"#);
        assert_eq!(serde_json::to_string(&Role::Human).unwrap(), r#""human""#);
    }
}
