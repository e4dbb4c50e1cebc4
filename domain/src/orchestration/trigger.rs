//! Consensus trigger
//!
//! Decides when the discussion is ready for a vote. The check only runs at
//! the opening of a cycle after at least one human checkpoint, and at most
//! once per phase.

use super::state::ConversationState;
use crate::conversation::Role;
use crate::core::string::contains_ignore_case;
use serde::{Deserialize, Serialize};

/// Marker agents or the human write to ask for a vote
pub const DEFAULT_READINESS_MARKER: &str = "READY FOR CONSENSUS";

/// Why the trigger fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// The configured phase threshold was reached
    PhaseThreshold,
    /// A participant wrote the readiness marker in the last cycle
    ReadinessMarker,
}

impl std::fmt::Display for TriggerReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriggerReason::PhaseThreshold => write!(f, "phase threshold reached"),
            TriggerReason::ReadinessMarker => write!(f, "readiness marker seen"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusTrigger {
    /// Vote once `phase` reaches this value
    pub after_phase: Option<u32>,
    /// Vote when this marker appears in the previous cycle
    pub readiness_marker: Option<String>,
}

impl Default for ConsensusTrigger {
    fn default() -> Self {
        Self {
            after_phase: None,
            readiness_marker: Some(DEFAULT_READINESS_MARKER.to_string()),
        }
    }
}

impl ConsensusTrigger {
    /// A trigger that never fires; the run only ends through the human or
    /// the cycle limit.
    pub fn disabled() -> Self {
        Self {
            after_phase: None,
            readiness_marker: None,
        }
    }

    pub fn with_after_phase(mut self, phase: u32) -> Self {
        self.after_phase = Some(phase);
        self
    }

    pub fn with_readiness_marker(mut self, marker: impl Into<String>) -> Self {
        let marker = marker.into();
        self.readiness_marker = (!marker.trim().is_empty()).then_some(marker);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.after_phase.is_some() || self.readiness_marker.is_some()
    }

    /// Check whether a consensus round should start now
    pub fn evaluate(&self, state: &ConversationState) -> Option<TriggerReason> {
        if !state.at_cycle_opening() || state.phase() == 0 || state.consensus_attempted_this_phase()
        {
            return None;
        }

        if self.after_phase.is_some_and(|p| state.phase() >= p) {
            return Some(TriggerReason::PhaseThreshold);
        }

        let marker = self.readiness_marker.as_deref()?;
        let previous_cycle = state.phase() - 1;
        state
            .store()
            .cycle(previous_cycle)
            .filter(|m| matches!(m.role, Role::Agent(_) | Role::Human))
            .any(|m| contains_ignore_case(&m.content, marker))
            .then_some(TriggerReason::ReadinessMarker)
    }
}
