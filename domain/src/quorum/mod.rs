//! Consensus voting
//!
//! Once the discussion is ready, every agent casts one [`Vote`] on the
//! current proposal. The [`ConsensusEvaluator`] decides whether the round
//! reached independent agreement; a failed round is kept as a
//! [`ConsensusRound`] and fed back into the next discussion cycle.

pub mod consensus;
pub mod parsing;
pub mod vote;

pub use consensus::{ConsensusEvaluator, ConsensusOutcome, ConsensusRound, NotReachedReason};
pub use parsing::{ParsedVote, VoteParseError, parse_vote};
pub use vote::{Vote, VoteDecision, VoteTally};
