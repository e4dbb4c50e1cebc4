//! Vote types for consensus rounds
//!
//! Votes follow a strict three-valued schema: every agent either approves,
//! rejects or abstains, and always gives a justification.

use super::parsing::ParsedVote;
use crate::agent::AgentId;
use serde::{Deserialize, Serialize};

/// Decision carried by a vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDecision {
    Approve,
    Reject,
    Abstain,
}

impl VoteDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteDecision::Approve => "APPROVE",
            VoteDecision::Reject => "REJECT",
            VoteDecision::Abstain => "ABSTAIN",
        }
    }

    /// Single-character marker used in vote summaries
    pub fn symbol(&self) -> char {
        match self {
            VoteDecision::Approve => '●',
            VoteDecision::Reject => '○',
            VoteDecision::Abstain => '–',
        }
    }
}

impl std::fmt::Display for VoteDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for VoteDecision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "approve" | "approved" | "yes" => Ok(VoteDecision::Approve),
            "reject" | "rejected" | "no" => Ok(VoteDecision::Reject),
            "abstain" | "abstained" => Ok(VoteDecision::Abstain),
            other => Err(format!(
                "Unknown vote: {}. Valid: APPROVE, REJECT, ABSTAIN",
                other
            )),
        }
    }
}

/// A single vote cast by an agent in a consensus round
///
/// # Example
///
/// ```
/// use roundtable_domain::quorum::{Vote, VoteDecision};
///
/// let vote = Vote::approve("agent1", "The proposal covers every requirement.");
/// assert_eq!(vote.decision, VoteDecision::Approve);
/// assert!(vote.is_approval());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    /// Agent that cast the vote
    pub agent: AgentId,
    /// The decision
    pub decision: VoteDecision,
    /// Reasoning given by the agent
    pub justification: String,
}

impl Vote {
    pub fn new(
        agent: impl Into<AgentId>,
        decision: VoteDecision,
        justification: impl Into<String>,
    ) -> Self {
        Self {
            agent: agent.into(),
            decision,
            justification: justification.into(),
        }
    }

    /// Attribute a parsed vote to the agent that cast it
    pub fn from_parsed(agent: impl Into<AgentId>, parsed: ParsedVote) -> Self {
        Self::new(agent, parsed.decision, parsed.justification)
    }

    pub fn approve(agent: impl Into<AgentId>, justification: impl Into<String>) -> Self {
        Self::new(agent, VoteDecision::Approve, justification)
    }

    pub fn reject(agent: impl Into<AgentId>, justification: impl Into<String>) -> Self {
        Self::new(agent, VoteDecision::Reject, justification)
    }

    pub fn abstain(agent: impl Into<AgentId>, justification: impl Into<String>) -> Self {
        Self::new(agent, VoteDecision::Abstain, justification)
    }

    pub fn is_approval(&self) -> bool {
        self.decision == VoteDecision::Approve
    }

    pub fn is_rejection(&self) -> bool {
        self.decision == VoteDecision::Reject
    }

    pub fn is_abstention(&self) -> bool {
        self.decision == VoteDecision::Abstain
    }
}

/// Counts of each decision in a set of votes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub approve_count: usize,
    pub reject_count: usize,
    pub abstain_count: usize,
}

impl VoteTally {
    pub fn from_votes(votes: &[Vote]) -> Self {
        let mut tally = Self::default();
        for vote in votes {
            match vote.decision {
                VoteDecision::Approve => tally.approve_count += 1,
                VoteDecision::Reject => tally.reject_count += 1,
                VoteDecision::Abstain => tally.abstain_count += 1,
            }
        }
        tally
    }

    pub fn total(&self) -> usize {
        self.approve_count + self.reject_count + self.abstain_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vote_creation() {
        let vote = Vote::reject("agent2", "Missing error handling");
        assert!(vote.is_rejection());
        assert_eq!(vote.agent.as_str(), "agent2");
        assert_eq!(vote.justification, "Missing error handling");
    }

    #[test]
    fn test_decision_from_str() {
        assert_eq!("APPROVE".parse::<VoteDecision>(), Ok(VoteDecision::Approve));
        assert_eq!(" reject ".parse::<VoteDecision>(), Ok(VoteDecision::Reject));
        assert_eq!("Abstain".parse::<VoteDecision>(), Ok(VoteDecision::Abstain));
        assert!("maybe".parse::<VoteDecision>().is_err());
    }

    #[test]
    fn test_decision_display_round_trips() {
        for decision in [
            VoteDecision::Approve,
            VoteDecision::Reject,
            VoteDecision::Abstain,
        ] {
            assert_eq!(decision.to_string().parse::<VoteDecision>(), Ok(decision));
        }
    }

    #[test]
    fn test_tally() {
        let votes = vec![
            Vote::approve("a", "ok"),
            Vote::approve("b", "ok"),
            Vote::reject("c", "no"),
            Vote::abstain("d", "unsure"),
        ];
        let tally = VoteTally::from_votes(&votes);
        assert_eq!(tally.approve_count, 2);
        assert_eq!(tally.reject_count, 1);
        assert_eq!(tally.abstain_count, 1);
        assert_eq!(tally.total(), 4);
    }
}
