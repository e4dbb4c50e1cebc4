//! Agent entities: individual profiles and the ordered roster.
//!
//! Agents are data, not types. A profile carries the identity, the role
//! prompt and the sampling temperature; the roster fixes the turn order at
//! construction time and never changes afterwards.

use super::value_objects::AgentId;
use crate::conversation::{HUMAN_LABEL, USER_LABEL};
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Minimum number of agents a council needs.
pub const MIN_AGENTS: usize = 2;

/// Default sampling temperature for agents that don't configure one.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Configuration of a single agent (immutable after creation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Identity the agent speaks under
    pub id: AgentId,
    /// Role / system prompt
    pub role_prompt: String,
    /// Sampling temperature (0.0 to 2.0)
    pub temperature: f32,
    /// Position in the turn order
    pub turn_order: usize,
}

impl AgentProfile {
    pub fn new(id: impl Into<AgentId>, role_prompt: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role_prompt: role_prompt.into(),
            temperature: DEFAULT_TEMPERATURE,
            turn_order: 0,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_turn_order(mut self, position: usize) -> Self {
        self.turn_order = position;
        self
    }

    fn validate(&self) -> Result<(), DomainError> {
        if self.id.as_str().trim().is_empty() {
            return Err(DomainError::InvalidAgent(
                "agent name cannot be empty".to_string(),
            ));
        }
        if self.id.as_str().contains(':') || self.id.as_str().contains('\n') {
            return Err(DomainError::InvalidAgent(format!(
                "agent name '{}' cannot contain ':' or line breaks",
                self.id
            )));
        }
        if [HUMAN_LABEL, USER_LABEL]
            .iter()
            .any(|label| self.id.matches(label))
        {
            return Err(DomainError::InvalidAgent(format!(
                "agent name '{}' is reserved for the human participants",
                self.id
            )));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(DomainError::InvalidAgent(format!(
                "temperature {} for '{}' is outside 0.0..=2.0",
                self.temperature, self.id
            )));
        }
        Ok(())
    }
}

/// Ordered, immutable set of agents taking part in a run.
///
/// Profiles are sorted by their configured `turn_order` (ties keep their
/// declaration order) and then renumbered `0..N`, so `turn_order` always
/// equals the index in [`AgentRoster::agents`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRoster {
    agents: Vec<AgentProfile>,
    chair: usize,
}

impl AgentRoster {
    /// Build a roster, validating identities and fixing the turn order.
    pub fn new(mut agents: Vec<AgentProfile>) -> Result<Self, DomainError> {
        if agents.len() < MIN_AGENTS {
            return Err(DomainError::InsufficientAgents {
                required: MIN_AGENTS,
                actual: agents.len(),
            });
        }

        for (i, agent) in agents.iter().enumerate() {
            agent.validate()?;
            if agents[..i].iter().any(|a| a.id.matches(agent.id.as_str())) {
                return Err(DomainError::DuplicateAgent(agent.id.to_string()));
            }
        }

        agents.sort_by_key(|a| a.turn_order);
        for (position, agent) in agents.iter_mut().enumerate() {
            agent.turn_order = position;
        }

        Ok(Self { agents, chair: 0 })
    }

    /// Designate the agent that authors the final answer.
    pub fn with_chair(mut self, chair: &str) -> Result<Self, DomainError> {
        self.chair = self
            .position(chair)
            .ok_or_else(|| DomainError::UnknownAgent(chair.to_string()))?;
        Ok(self)
    }

    /// Agents in turn order.
    pub fn agents(&self) -> &[AgentProfile] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Agent at a turn-order position, wrapping around.
    pub fn at(&self, position: usize) -> &AgentProfile {
        &self.agents[position % self.agents.len()]
    }

    /// Look up an agent by (case-insensitive) name.
    pub fn get(&self, name: &str) -> Option<&AgentProfile> {
        self.agents.iter().find(|a| a.id.matches(name))
    }

    /// Turn-order position of an agent.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.agents.iter().position(|a| a.id.matches(name))
    }

    /// The agent that authors the final answer (first agent unless designated).
    pub fn chair(&self) -> &AgentProfile {
        &self.agents[self.chair]
    }

    /// Identities of every agent except `speaker`.
    pub fn others<'a>(&'a self, speaker: &'a AgentId) -> impl Iterator<Item = &'a AgentId> + 'a {
        self.agents
            .iter()
            .map(|a| &a.id)
            .filter(move |id| !id.matches(speaker.as_str()))
    }

    pub fn ids(&self) -> impl Iterator<Item = &AgentId> {
        self.agents.iter().map(|a| &a.id)
    }
}
