//! Orchestration: the phase state machine and everything that drives it.
//!
//! - [`state::ConversationState`] - the single mutable record of a run
//! - [`scheduler::TurnScheduler`] - whose turn it is
//! - [`trigger::ConsensusTrigger`] - when to leave discussion for a vote
//! - [`policy::CouncilPolicy`] - run-wide limits and thresholds

pub mod policy;
pub mod scheduler;
pub mod state;
pub mod trigger;

pub use policy::{CouncilPolicy, DEFAULT_MAX_ITERATIONS, DEFAULT_MAX_RETRIES};
pub use scheduler::TurnScheduler;
pub use state::{ConversationState, FeedbackOutcome, PhaseKind, TransitionRecord};
pub use trigger::{ConsensusTrigger, DEFAULT_READINESS_MARKER, TriggerReason};
