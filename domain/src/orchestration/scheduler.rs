//! Turn scheduling
//!
//! Speakers follow the roster's fixed cyclic order. Each discussion cycle
//! starts at an opener and advances by one per iteration, wrapping around
//! the roster.

use super::state::ConversationState;
use crate::agent::{AgentProfile, AgentRoster};
use serde::{Deserialize, Serialize};

/// Picks the next speaker from the roster and the conversation state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnScheduler {
    /// Start cycle `p` with agent `p mod N` instead of always the first
    pub rotate_opener: bool,
}

impl TurnScheduler {
    pub fn new(rotate_opener: bool) -> Self {
        Self { rotate_opener }
    }

    /// Roster position that opens the cycle for `phase`
    pub fn opener(&self, roster: &AgentRoster, phase: u32) -> usize {
        if self.rotate_opener && !roster.is_empty() {
            phase as usize % roster.len()
        } else {
            0
        }
    }

    /// Agent whose turn it is at the current position of the cycle
    pub fn next_speaker<'a>(
        &self,
        roster: &'a AgentRoster,
        state: &ConversationState,
    ) -> &'a AgentProfile {
        let opener = self.opener(roster, state.phase());
        roster.at(opener + state.iteration() as usize)
    }
}
