//! Consensus evaluation
//!
//! The evaluator turns one round of votes into a decision. Agreement must
//! be explicit and independent: a missing vote is never read as approval,
//! a single rejection blocks, and abstentions beyond the configured
//! threshold count as insufficient participation.
//!
//! | Check (in order) | Outcome |
//! |------------------|---------|
//! | fewer distinct voters than agents | `NotReached(Incomplete)` |
//! | any `Reject` | `NotReached(Disagreement)` |
//! | abstentions > `max_abstentions`, or no approvals | `NotReached(InsufficientParticipation)` |
//! | otherwise | `Reached` |

use super::vote::{Vote, VoteTally};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Why a round failed to reach consensus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotReachedReason {
    /// At least one agent rejected the proposal
    Disagreement,
    /// Not every agent cast a vote
    Incomplete,
    /// Too many abstentions to call it agreement
    InsufficientParticipation,
}

impl std::fmt::Display for NotReachedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotReachedReason::Disagreement => write!(f, "Disagreement"),
            NotReachedReason::Incomplete => write!(f, "Incomplete"),
            NotReachedReason::InsufficientParticipation => write!(f, "InsufficientParticipation"),
        }
    }
}

/// Outcome of a consensus round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsensusOutcome {
    Reached,
    NotReached(NotReachedReason),
}

impl ConsensusOutcome {
    pub fn is_reached(&self) -> bool {
        matches!(self, ConsensusOutcome::Reached)
    }

    pub fn reason(&self) -> Option<NotReachedReason> {
        match self {
            ConsensusOutcome::Reached => None,
            ConsensusOutcome::NotReached(reason) => Some(*reason),
        }
    }
}

impl std::fmt::Display for ConsensusOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsensusOutcome::Reached => write!(f, "Reached"),
            ConsensusOutcome::NotReached(reason) => write!(f, "NotReached({})", reason),
        }
    }
}

/// Applies the unanimity rules to a set of votes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusEvaluator {
    /// Abstentions tolerated before the round counts as insufficient
    pub max_abstentions: usize,
}

impl ConsensusEvaluator {
    pub fn new(max_abstentions: usize) -> Self {
        Self { max_abstentions }
    }

    /// Decide a round. Duplicate votes from the same agent are ignored
    /// after the first one.
    ///
    /// # Example
    ///
    /// ```
    /// use roundtable_domain::quorum::{ConsensusEvaluator, ConsensusOutcome, NotReachedReason, Vote};
    ///
    /// let evaluator = ConsensusEvaluator::default();
    /// let votes = vec![Vote::approve("a", "ok"), Vote::approve("b", "ok")];
    /// assert_eq!(
    ///     evaluator.evaluate(&votes, 3),
    ///     ConsensusOutcome::NotReached(NotReachedReason::Incomplete)
    /// );
    /// ```
    pub fn evaluate(&self, votes: &[Vote], total_agents: usize) -> ConsensusOutcome {
        let distinct = distinct_votes(votes);

        if distinct.len() < total_agents {
            return ConsensusOutcome::NotReached(NotReachedReason::Incomplete);
        }

        let tally = VoteTally::from_votes(&distinct);

        if tally.reject_count > 0 {
            return ConsensusOutcome::NotReached(NotReachedReason::Disagreement);
        }

        if tally.abstain_count > self.max_abstentions || tally.approve_count == 0 {
            return ConsensusOutcome::NotReached(NotReachedReason::InsufficientParticipation);
        }

        ConsensusOutcome::Reached
    }
}

fn distinct_votes(votes: &[Vote]) -> Vec<Vote> {
    let mut seen = HashSet::new();
    votes
        .iter()
        .filter(|v| seen.insert(v.agent.as_str().to_lowercase()))
        .cloned()
        .collect()
}

/// One completed consensus round
///
/// Rounds are kept in the conversation state and handed back to agents as
/// context when discussion resumes after a failed round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusRound {
    /// Round number (1-indexed)
    pub round: usize,
    /// Completed feedback cycles when the round was held
    pub phase: u32,
    /// Text the agents voted on
    pub proposal: String,
    /// Votes in roster order
    pub votes: Vec<Vote>,
    /// Evaluator decision
    pub outcome: ConsensusOutcome,
}

impl ConsensusRound {
    pub fn new(
        round: usize,
        phase: u32,
        proposal: impl Into<String>,
        votes: Vec<Vote>,
        outcome: ConsensusOutcome,
    ) -> Self {
        Self {
            round,
            phase,
            proposal: proposal.into(),
            votes,
            outcome,
        }
    }

    pub fn is_reached(&self) -> bool {
        self.outcome.is_reached()
    }

    pub fn tally(&self) -> VoteTally {
        VoteTally::from_votes(&self.votes)
    }

    /// Visual vote summary (e.g., "[●●○]")
    pub fn vote_summary(&self) -> String {
        let mut summary = String::from("[");
        for vote in &self.votes {
            summary.push(vote.decision.symbol());
        }
        summary.push(']');
        summary
    }

    /// Justifications of every non-approving vote, one per paragraph
    pub fn dissent_feedback(&self) -> String {
        self.votes
            .iter()
            .filter(|v| !v.is_approval())
            .map(|v| format!("{} ({}): {}", v.agent, v.decision, v.justification))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quorum::vote::Vote;

    #[test]
    fn test_unanimous_approval_reaches() {
        let votes = vec![
            Vote::approve("a", "yes"),
            Vote::approve("b", "yes"),
            Vote::approve("c", "yes"),
        ];
        assert_eq!(
            ConsensusEvaluator::default().evaluate(&votes, 3),
            ConsensusOutcome::Reached
        );
    }

    #[test]
    fn test_single_reject_is_disagreement() {
        let votes = vec![
            Vote::approve("a", "yes"),
            Vote::approve("b", "yes"),
            Vote::reject("c", "no"),
        ];
        assert_eq!(
            ConsensusEvaluator::default().evaluate(&votes, 3),
            ConsensusOutcome::NotReached(NotReachedReason::Disagreement)
        );
    }

    #[test]
    fn test_missing_vote_is_incomplete() {
        let votes = vec![Vote::approve("a", "yes"), Vote::approve("b", "yes")];
        assert_eq!(
            ConsensusEvaluator::default().evaluate(&votes, 3),
            ConsensusOutcome::NotReached(NotReachedReason::Incomplete)
        );
    }

    #[test]
    fn test_duplicate_votes_do_not_fill_missing_seats() {
        let votes = vec![
            Vote::approve("a", "yes"),
            Vote::approve("A", "yes again"),
            Vote::approve("b", "yes"),
        ];
        assert_eq!(
            ConsensusEvaluator::default().evaluate(&votes, 3),
            ConsensusOutcome::NotReached(NotReachedReason::Incomplete)
        );
    }

    #[test]
    fn test_abstention_blocks_by_default() {
        let votes = vec![Vote::approve("a", "yes"), Vote::abstain("b", "unsure")];
        assert_eq!(
            ConsensusEvaluator::default().evaluate(&votes, 2),
            ConsensusOutcome::NotReached(NotReachedReason::InsufficientParticipation)
        );
    }

    #[test]
    fn test_abstention_within_threshold() {
        let votes = vec![
            Vote::approve("a", "yes"),
            Vote::approve("b", "yes"),
            Vote::abstain("c", "no opinion"),
        ];
        assert_eq!(
            ConsensusEvaluator::new(1).evaluate(&votes, 3),
            ConsensusOutcome::Reached
        );
    }

    #[test]
    fn test_all_abstain_never_reaches() {
        let votes = vec![Vote::abstain("a", "-"), Vote::abstain("b", "-")];
        assert_eq!(
            ConsensusEvaluator::new(5).evaluate(&votes, 2),
            ConsensusOutcome::NotReached(NotReachedReason::InsufficientParticipation)
        );
    }

    #[test]
    fn test_round_summary_and_feedback() {
        let votes = vec![
            Vote::approve("a", "fine"),
            Vote::reject("b", "Security issue found"),
            Vote::abstain("c", "Out of my depth"),
        ];
        let outcome = ConsensusEvaluator::default().evaluate(&votes, 3);
        let round = ConsensusRound::new(1, 2, "proposal", votes, outcome);

        assert_eq!(round.vote_summary(), "[●○–]");
        assert!(!round.is_reached());
        let feedback = round.dissent_feedback();
        assert!(feedback.contains("b (REJECT): Security issue found"));
        assert!(feedback.contains("c (ABSTAIN): Out of my depth"));
        assert!(!feedback.contains("fine"));
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(ConsensusOutcome::Reached.to_string(), "Reached");
        assert_eq!(
            ConsensusOutcome::NotReached(NotReachedReason::Disagreement).to_string(),
            "NotReached(Disagreement)"
        );
    }
}
