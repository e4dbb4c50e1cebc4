//! Conversation state machine
//!
//! [`ConversationState`] is the single record the driver threads through a
//! run. It owns the [`MessageStore`], tracks the feedback-cycle counter and
//! the position inside the current cycle, and only moves between
//! [`PhaseKind`]s along the legal edges below. Every accepted move is kept
//! in an audit log of [`TransitionRecord`]s.
//!
//! ```text
//!            ┌──────────────┐ cycle full  ┌───────────────┐
//!   start ──▶│  Discussion  │────────────▶│ AwaitingHuman │
//!            └──────────────┘◀────────────└───────────────┘
//!              │   ▲     │    feedback          │ empty
//!      trigger │   │ not │ cycle limit          ▼
//!              ▼   │ met └───────────────▶ ┌────────────┐
//!            ┌──────────────┐              │ Terminated │
//!            │  Consensus   │              └────────────┘
//!            └──────────────┘                    ▲
//!              │ reached                         │
//!              ▼                                 │
//!            ┌──────────────┐   final answer     │
//!            │ FinalAnswer  │────────────────────┘
//!            └──────────────┘
//! ```
//!
//! While the machine has not terminated, the message count obeys
//! `initial_message_count + phase * (max_iterations + 1)` at every cycle
//! boundary: each completed cycle adds `max_iterations` agent messages and
//! one human message.

use crate::agent::AgentId;
use crate::conversation::{Message, MessageStore};
use crate::core::error::DomainError;
use crate::core::question::Question;
use crate::quorum::{ConsensusOutcome, ConsensusRound};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level state of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    Discussion,
    Consensus,
    FinalAnswer,
    AwaitingHuman,
    Terminated,
}

impl PhaseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseKind::Discussion => "discussion",
            PhaseKind::Consensus => "consensus",
            PhaseKind::FinalAnswer => "final_answer",
            PhaseKind::AwaitingHuman => "awaiting_human",
            PhaseKind::Terminated => "terminated",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PhaseKind::Terminated)
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether `from -> to` is an edge of the machine.
fn is_legal_transition(from: PhaseKind, to: PhaseKind) -> bool {
    use PhaseKind::*;

    matches!(
        (from, to),
        (Discussion, Discussion)
            | (Discussion, AwaitingHuman)
            | (Discussion, Consensus)
            // cycle limit
            | (Discussion, Terminated)
            | (AwaitingHuman, Discussion)
            | (AwaitingHuman, Terminated)
            | (Consensus, FinalAnswer)
            | (Consensus, Discussion)
            | (FinalAnswer, Terminated)
    )
}

/// One accepted state change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: PhaseKind,
    pub to: PhaseKind,
    /// Completed feedback cycles at the time of the transition
    pub phase: u32,
    /// Position in the cycle at the time of the transition
    pub iteration: u32,
}

/// What a human checkpoint resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackOutcome {
    /// Feedback was appended and a new cycle opened
    Resumed { phase: u32 },
    /// No feedback; the run is over
    Ended,
}

/// Mutable state of a single run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationState {
    store: MessageStore,
    phase: u32,
    iteration: u32,
    kind: PhaseKind,
    initial_message_count: usize,
    max_iterations: u32,
    consensus_rounds: Vec<ConsensusRound>,
    last_consensus_phase: Option<u32>,
    transitions: Vec<TransitionRecord>,
}

impl ConversationState {
    /// Start a run with the user's question as the only message.
    ///
    /// `max_iterations` is the number of agent turns per cycle; a value of
    /// zero is treated as one.
    pub fn new(question: &Question, max_iterations: u32) -> Self {
        let mut store = MessageStore::new();
        // the store is empty, so sequence 0 is always accepted
        let _ = store.append(Message::user(question.content(), 0, 0));

        Self {
            initial_message_count: store.len(),
            store,
            phase: 0,
            iteration: 0,
            kind: PhaseKind::Discussion,
            max_iterations: max_iterations.max(1),
            consensus_rounds: Vec::new(),
            last_consensus_phase: None,
            transitions: Vec::new(),
        }
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    pub fn history(&self) -> &[Message] {
        self.store.history()
    }

    pub fn phase(&self) -> u32 {
        self.phase
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    pub fn kind(&self) -> PhaseKind {
        self.kind
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn initial_message_count(&self) -> usize {
        self.initial_message_count
    }

    pub fn is_terminated(&self) -> bool {
        self.kind.is_terminal()
    }

    /// Whether the current discussion cycle has used its whole budget
    pub fn cycle_complete(&self) -> bool {
        self.kind == PhaseKind::Discussion && self.iteration >= self.max_iterations
    }

    /// Whether the machine sits at the opening of a discussion cycle
    pub fn at_cycle_opening(&self) -> bool {
        self.kind == PhaseKind::Discussion && self.iteration == 0
    }

    pub fn consensus_rounds(&self) -> &[ConsensusRound] {
        &self.consensus_rounds
    }

    pub fn latest_round(&self) -> Option<&ConsensusRound> {
        self.consensus_rounds.last()
    }

    /// Whether a consensus round already ran during the current phase
    pub fn consensus_attempted_this_phase(&self) -> bool {
        self.last_consensus_phase == Some(self.phase)
    }

    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    /// Message count the length invariant demands at a cycle boundary
    pub fn expected_len(&self) -> usize {
        self.initial_message_count + self.phase as usize * (self.max_iterations as usize + 1)
    }

    /// Length invariant, including the agent turns taken so far in the
    /// current cycle
    pub fn invariant_holds(&self) -> bool {
        self.is_terminated() || self.store.len() == self.expected_len() + self.iteration as usize
    }

    /// Append an accepted discussion turn.
    pub fn record_agent_message(
        &mut self,
        speaker: &AgentId,
        content: impl Into<String>,
    ) -> Result<&Message, DomainError> {
        self.ensure(PhaseKind::Discussion, PhaseKind::Discussion)?;
        if self.iteration >= self.max_iterations {
            return Err(DomainError::IterationBudgetExhausted {
                max: self.max_iterations,
            });
        }

        let message = Message::agent(
            speaker.clone(),
            content,
            self.phase,
            self.store.next_sequence(),
        );
        self.store.append(message)?;
        self.transition(PhaseKind::Discussion);
        self.iteration += 1;

        self.last_message()
    }

    /// Close the discussion cycle and wait for the human.
    pub fn open_checkpoint(&mut self) -> Result<(), DomainError> {
        self.ensure(PhaseKind::Discussion, PhaseKind::AwaitingHuman)?;
        if self.iteration < self.max_iterations {
            return Err(DomainError::IllegalTransition {
                from: self.kind,
                to: PhaseKind::AwaitingHuman,
            });
        }
        self.transition(PhaseKind::AwaitingHuman);
        Ok(())
    }

    /// Fold the human's answer into the conversation.
    ///
    /// Non-empty feedback is appended as a Human message and opens the next
    /// cycle. Absent or blank feedback terminates the run without touching
    /// the history.
    pub fn absorb_feedback(
        &mut self,
        feedback: Option<&str>,
    ) -> Result<FeedbackOutcome, DomainError> {
        let feedback = feedback.map(str::trim).filter(|f| !f.is_empty());

        match feedback {
            None => {
                self.ensure(PhaseKind::AwaitingHuman, PhaseKind::Terminated)?;
                self.transition(PhaseKind::Terminated);
                Ok(FeedbackOutcome::Ended)
            }
            Some(text) => {
                self.ensure(PhaseKind::AwaitingHuman, PhaseKind::Discussion)?;
                let message = Message::human(text, self.phase, self.store.next_sequence());
                self.store.append(message)?;
                self.transition(PhaseKind::Discussion);
                self.phase += 1;
                self.iteration = 0;
                Ok(FeedbackOutcome::Resumed { phase: self.phase })
            }
        }
    }

    /// Leave the discussion for a vote. Only legal at a cycle opening.
    pub fn enter_consensus(&mut self) -> Result<(), DomainError> {
        self.ensure(PhaseKind::Discussion, PhaseKind::Consensus)?;
        if self.iteration != 0 {
            return Err(DomainError::IllegalTransition {
                from: self.kind,
                to: PhaseKind::Consensus,
            });
        }
        self.last_consensus_phase = Some(self.phase);
        self.transition(PhaseKind::Consensus);
        Ok(())
    }

    /// Record a finished round and move on: to the final answer when the
    /// round reached consensus, back to a fresh discussion cycle otherwise.
    pub fn resolve_consensus(
        &mut self,
        round: ConsensusRound,
    ) -> Result<ConsensusOutcome, DomainError> {
        let outcome = round.outcome;
        let next = if outcome.is_reached() {
            PhaseKind::FinalAnswer
        } else {
            PhaseKind::Discussion
        };

        self.ensure(PhaseKind::Consensus, next)?;
        self.consensus_rounds.push(round);
        self.transition(next);
        self.iteration = 0;
        Ok(outcome)
    }

    /// Append the validated final answer and terminate.
    pub fn complete_with_final_answer(
        &mut self,
        author: &AgentId,
        content: impl Into<String>,
    ) -> Result<&Message, DomainError> {
        self.ensure(PhaseKind::FinalAnswer, PhaseKind::Terminated)?;
        let message = Message::agent(
            author.clone(),
            content,
            self.phase,
            self.store.next_sequence(),
        );
        self.store.append(message)?;
        self.transition(PhaseKind::Terminated);

        self.last_message()
    }

    /// Stop at a cycle opening because the cycle limit was reached.
    pub fn halt(&mut self) -> Result<(), DomainError> {
        self.ensure(PhaseKind::Discussion, PhaseKind::Terminated)?;
        self.transition(PhaseKind::Terminated);
        Ok(())
    }

    fn ensure(&self, required: PhaseKind, to: PhaseKind) -> Result<(), DomainError> {
        if self.kind != required || !is_legal_transition(self.kind, to) {
            return Err(DomainError::IllegalTransition {
                from: self.kind,
                to,
            });
        }
        Ok(())
    }

    fn transition(&mut self, to: PhaseKind) {
        self.transitions.push(TransitionRecord {
            from: self.kind,
            to,
            phase: self.phase,
            iteration: self.iteration,
        });
        self.kind = to;
    }

    fn last_message(&self) -> Result<&Message, DomainError> {
        self.store
            .last()
            .ok_or(DomainError::OrderingViolation {
                expected: self.store.len(),
                actual: 0,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quorum::{ConsensusEvaluator, NotReachedReason, Vote};

    fn question() -> Question {
        Question::new("Q").unwrap()
    }

    fn a() -> AgentId {
        AgentId::new("A")
    }

    fn b() -> AgentId {
        AgentId::new("B")
    }

    fn run_cycle(state: &mut ConversationState, speakers: &[AgentId]) {
        for (i, speaker) in speakers.iter().enumerate() {
            state
                .record_agent_message(speaker, format!("m{}", i + 1))
                .unwrap();
        }
    }

    #[test]
    fn test_new_state() {
        let state = ConversationState::new(&question(), 3);
        assert_eq!(state.kind(), PhaseKind::Discussion);
        assert_eq!(state.phase(), 0);
        assert_eq!(state.iteration(), 0);
        assert_eq!(state.history().len(), 1);
        assert_eq!(state.history()[0].content, "Q");
        assert!(state.invariant_holds());
    }

    #[test]
    fn test_full_cycle_with_feedback() {
        let mut state = ConversationState::new(&question(), 3);
        run_cycle(&mut state, &[a(), b(), a()]);
        assert!(state.cycle_complete());
        assert!(state.invariant_holds());

        state.open_checkpoint().unwrap();
        assert_eq!(state.kind(), PhaseKind::AwaitingHuman);

        let outcome = state.absorb_feedback(Some("h1")).unwrap();
        assert_eq!(outcome, FeedbackOutcome::Resumed { phase: 1 });
        assert_eq!(state.phase(), 1);
        assert_eq!(state.iteration(), 0);
        assert_eq!(state.kind(), PhaseKind::Discussion);

        let contents: Vec<_> = state.history().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["Q", "m1", "m2", "m3", "h1"]);
        assert_eq!(state.history().len(), state.expected_len());
        assert_eq!(state.history()[4].cycle, 0);
    }

    #[test]
    fn test_empty_feedback_terminates_without_appending() {
        let mut state = ConversationState::new(&question(), 2);
        run_cycle(&mut state, &[a(), b()]);
        state.open_checkpoint().unwrap();
        let before = state.history().len();

        assert_eq!(state.absorb_feedback(Some("   ")).unwrap(), FeedbackOutcome::Ended);
        assert!(state.is_terminated());
        assert_eq!(state.history().len(), before);
        assert_eq!(state.phase(), 0);
    }

    #[test]
    fn test_absent_feedback_terminates() {
        let mut state = ConversationState::new(&question(), 1);
        run_cycle(&mut state, &[a()]);
        state.open_checkpoint().unwrap();
        assert_eq!(state.absorb_feedback(None).unwrap(), FeedbackOutcome::Ended);
        assert!(state.is_terminated());
    }

    #[test]
    fn test_budget_enforced() {
        let mut state = ConversationState::new(&question(), 2);
        run_cycle(&mut state, &[a(), b()]);
        let err = state.record_agent_message(&a(), "extra").unwrap_err();
        assert_eq!(err, DomainError::IterationBudgetExhausted { max: 2 });
        assert_eq!(state.history().len(), 3);
    }

    #[test]
    fn test_checkpoint_before_cycle_end_is_illegal() {
        let mut state = ConversationState::new(&question(), 3);
        run_cycle(&mut state, &[a()]);
        assert!(matches!(
            state.open_checkpoint(),
            Err(DomainError::IllegalTransition { .. })
        ));
    }

    #[test]
    fn test_terminated_rejects_everything() {
        let mut state = ConversationState::new(&question(), 1);
        state.halt().unwrap();
        assert_eq!(
            state.record_agent_message(&a(), "late").unwrap_err(),
            DomainError::IllegalTransition {
                from: PhaseKind::Terminated,
                to: PhaseKind::Discussion,
            }
        );
        assert!(state.absorb_feedback(Some("x")).is_err());
        assert!(state.enter_consensus().is_err());
    }

    #[test]
    fn test_consensus_not_reached_returns_to_discussion() {
        let mut state = ConversationState::new(&question(), 2);
        run_cycle(&mut state, &[a(), b()]);
        state.open_checkpoint().unwrap();
        state.absorb_feedback(Some("vote please")).unwrap();

        state.enter_consensus().unwrap();
        assert!(state.consensus_attempted_this_phase());

        let votes = vec![Vote::approve("A", "ok"), Vote::reject("B", "not yet")];
        let outcome = ConsensusEvaluator::default().evaluate(&votes, 2);
        let round = ConsensusRound::new(1, state.phase(), "m2", votes, outcome);

        let outcome = state.resolve_consensus(round).unwrap();
        assert_eq!(
            outcome,
            ConsensusOutcome::NotReached(NotReachedReason::Disagreement)
        );
        assert_eq!(state.kind(), PhaseKind::Discussion);
        assert_eq!(state.iteration(), 0);
        assert_eq!(state.consensus_rounds().len(), 1);
        assert!(state.invariant_holds());
    }

    #[test]
    fn test_consensus_reached_then_final_answer() {
        let mut state = ConversationState::new(&question(), 1);
        run_cycle(&mut state, &[a()]);
        state.open_checkpoint().unwrap();
        state.absorb_feedback(Some("go")).unwrap();
        state.enter_consensus().unwrap();

        let votes = vec![Vote::approve("A", "ok"), Vote::approve("B", "ok")];
        let round = ConsensusRound::new(1, 1, "m1", votes, ConsensusOutcome::Reached);
        state.resolve_consensus(round).unwrap();
        assert_eq!(state.kind(), PhaseKind::FinalAnswer);

        let len = state.history().len();
        let message = state
            .complete_with_final_answer(&a(), "# Summary\n...")
            .unwrap();
        assert_eq!(message.sequence, len);
        assert!(state.is_terminated());
        assert_eq!(state.history().len(), len + 1);
    }

    #[test]
    fn test_consensus_only_at_cycle_opening() {
        let mut state = ConversationState::new(&question(), 2);
        run_cycle(&mut state, &[a()]);
        assert!(state.enter_consensus().is_err());
    }

    #[test]
    fn test_transition_log() {
        let mut state = ConversationState::new(&question(), 1);
        run_cycle(&mut state, &[a()]);
        state.open_checkpoint().unwrap();
        state.absorb_feedback(None).unwrap();

        let path: Vec<_> = state.transitions().iter().map(|t| (t.from, t.to)).collect();
        assert_eq!(
            path,
            vec![
                (PhaseKind::Discussion, PhaseKind::Discussion),
                (PhaseKind::Discussion, PhaseKind::AwaitingHuman),
                (PhaseKind::AwaitingHuman, PhaseKind::Terminated),
            ]
        );
    }

    #[test]
    fn test_legal_transition_table() {
        use PhaseKind::*;
        assert!(is_legal_transition(Consensus, FinalAnswer));
        assert!(is_legal_transition(FinalAnswer, Terminated));
        assert!(!is_legal_transition(Terminated, Discussion));
        assert!(!is_legal_transition(AwaitingHuman, Consensus));
        assert!(!is_legal_transition(FinalAnswer, Discussion));
    }

    #[test]
    fn test_length_invariant_over_several_cycles() {
        let mut state = ConversationState::new(&question(), 3);
        for cycle in 0..4 {
            run_cycle(&mut state, &[a(), b(), a()]);
            state.open_checkpoint().unwrap();
            state
                .absorb_feedback(Some(format!("feedback {cycle}").as_str()))
                .unwrap();
            assert_eq!(state.history().len(), state.expected_len());
        }
        assert_eq!(state.history().len(), 1 + 4 * 4);
    }
}
