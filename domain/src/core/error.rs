//! Domain error types

use crate::orchestration::state::PhaseKind;
use thiserror::Error;

/// Domain-level errors
///
/// Every variant here is either a configuration problem detected while
/// building domain values, or an internal invariant breach. The latter are
/// never expected in a correct run and are treated as fatal by the driver.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("At least {required} agents are required, got {actual}")]
    InsufficientAgents { required: usize, actual: usize },

    #[error("Duplicate agent identity: {0}")]
    DuplicateAgent(String),

    #[error("Invalid agent: {0}")]
    InvalidAgent(String),

    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Message sequence out of order: expected {expected}, got {actual}")]
    OrderingViolation { expected: usize, actual: usize },

    #[error("Illegal state transition: {from} -> {to}")]
    IllegalTransition { from: PhaseKind, to: PhaseKind },

    #[error("Iteration budget of {max} exhausted for the current cycle")]
    IterationBudgetExhausted { max: u32 },

    #[error("Invalid vote: {0}")]
    InvalidVote(String),
}

impl DomainError {
    /// Whether this error signals a broken driver rather than bad input
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            DomainError::OrderingViolation { .. }
                | DomainError::IllegalTransition { .. }
                | DomainError::IterationBudgetExhausted { .. }
        )
    }
}
