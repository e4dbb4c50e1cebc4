//! Domain layer for roundtable
//!
//! This crate contains the core of a moderated multi-agent discussion: the
//! message store, the phase state machine, turn scheduling, message
//! validation and consensus voting. It has no dependencies on
//! infrastructure or presentation concerns and performs no I/O.
//!
//! # Core Concepts
//!
//! ## Discussion cycles
//!
//! Agents speak in a fixed cyclic order for `max_iterations` turns, then a
//! human checkpoint either adds feedback and opens the next cycle or ends
//! the run.
//!
//! ## Consensus
//!
//! When the discussion is ready, every agent votes on the latest proposal.
//! Only unanimous, complete agreement moves the run on to the final answer.

pub mod agent;
pub mod config;
pub mod conversation;
pub mod core;
pub mod orchestration;
pub mod prompt;
pub mod quorum;
pub mod usage;
pub mod validation;

// Re-export commonly used types
pub use agent::{AgentId, AgentProfile, AgentRoster, DEFAULT_TEMPERATURE, MIN_AGENTS};
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use conversation::{HUMAN_LABEL, Message, MessageStore, Role, USER_LABEL};
pub use core::{error::DomainError, question::Question};
pub use orchestration::{
    ConsensusTrigger, ConversationState, CouncilPolicy, FeedbackOutcome, PhaseKind,
    TransitionRecord, TriggerReason, TurnScheduler,
};
pub use prompt::PromptTemplate;
pub use quorum::{
    ConsensusEvaluator, ConsensusOutcome, ConsensusRound, NotReachedReason, Vote, VoteDecision,
    parse_vote,
};
pub use usage::{TokenUsage, UsageLedger, estimate_tokens};
pub use validation::{FinalAnswerSchema, MessageValidator, ValidationResult, Violation};
