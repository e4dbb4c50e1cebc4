//! Append-only message store
//!
//! The store is the single owner of the conversation history. Sequence
//! numbers are assigned by the one active writer and must arrive in order;
//! anything else is an [`OrderingViolation`](DomainError::OrderingViolation).

use super::message::Message;
use crate::agent::AgentId;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Ordered, append-only log of every utterance in a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageStore {
    messages: Vec<Message>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message whose `sequence` must equal the current length.
    pub fn append(&mut self, message: Message) -> Result<(), DomainError> {
        let expected = self.messages.len();
        if message.sequence != expected {
            return Err(DomainError::OrderingViolation {
                expected,
                actual: message.sequence,
            });
        }
        self.messages.push(message);
        Ok(())
    }

    /// Read-only view of the full history.
    pub fn history(&self) -> &[Message] {
        &self.messages
    }

    /// History as seen by one agent.
    ///
    /// All agents currently observe the same transcript, so this is the full
    /// history. Per-agent redaction policies hook in here.
    pub fn history_for_agent(&self, _agent: &AgentId) -> &[Message] {
        &self.messages
    }

    /// Sequence number the next appended message must carry.
    pub fn next_sequence(&self) -> usize {
        self.messages.len()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Most recent message written by any agent.
    pub fn last_agent_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role.is_agent())
    }

    /// Messages written during a given cycle.
    pub fn cycle(&self, cycle: u32) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(move |m| m.cycle == cycle)
    }
}
