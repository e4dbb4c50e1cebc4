//! Progress notification port
//!
//! Defines the interface for reporting progress while a council runs.

use super::agent_invoker::{TurnFailure, TurnPurpose};
use roundtable_domain::{AgentId, ConsensusRound, Message, Vote};

/// Callback for progress updates during a run
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console, web UI, etc.)
pub trait CouncilProgressNotifier: Send + Sync {
    /// Called before an agent is invoked
    fn on_turn_start(&self, agent: &AgentId, purpose: TurnPurpose, attempt: u32);

    /// Called when a message has been appended to the conversation
    fn on_message(&self, message: &Message);

    /// Called when an attempt failed and will be retried (or not)
    fn on_attempt_failed(&self, agent: &AgentId, attempt: u32, failure: &TurnFailure);

    /// Called when the run stops for human review
    fn on_checkpoint(&self, _phase: u32) {}

    /// Called when a consensus round starts
    fn on_consensus_start(&self, _round: usize, _proposal: &str) {}

    /// Called for each vote cast
    fn on_vote(&self, _vote: &Vote) {}

    /// Called when a consensus round has been decided
    fn on_consensus_complete(&self, _round: &ConsensusRound) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl CouncilProgressNotifier for NoProgress {
    fn on_turn_start(&self, _agent: &AgentId, _purpose: TurnPurpose, _attempt: u32) {}
    fn on_message(&self, _message: &Message) {}
    fn on_attempt_failed(&self, _agent: &AgentId, _attempt: u32, _failure: &TurnFailure) {}
}
