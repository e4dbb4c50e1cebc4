//! Human feedback port
//!
//! At the end of every discussion cycle the driver stops at a checkpoint
//! and asks the human for feedback.
//!
//! # Architecture
//!
//! Following the Ports and Adapters pattern:
//! - **Port**: [`HumanFeedbackPort`] - defined here in application layer
//! - **Adapter**: `InteractiveHumanFeedback` - implemented in presentation layer
//!
//! # Flow
//!
//! ```text
//! cycle of max_iterations agent turns
//!        ↓
//! HumanFeedbackPort::request_feedback()
//!        ↓
//! Some(text)  → appended as a Human message, next cycle
//! None / ""   → run ends
//! ```

use async_trait::async_trait;
use roundtable_domain::{ConsensusRound, Message};
use thiserror::Error;

/// What the human sees at a checkpoint
#[derive(Debug, Clone, Copy)]
pub struct Checkpoint<'a> {
    pub history: &'a [Message],
    /// Completed feedback cycles so far
    pub phase: u32,
    pub latest_round: Option<&'a ConsensusRound>,
}

/// Error type for human feedback operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HumanFeedbackError {
    /// User cancelled the prompt (e.g. Ctrl+D). Treated as no feedback.
    #[error("Operation cancelled")]
    Cancelled,

    /// Input/output error (e.g., terminal read failure).
    #[error("I/O error: {0}")]
    IoError(String),
}

#[async_trait]
pub trait HumanFeedbackPort: Send + Sync {
    /// Block until the human answers. `None` or blank text ends the run.
    async fn request_feedback(
        &self,
        checkpoint: &Checkpoint<'_>,
    ) -> Result<Option<String>, HumanFeedbackError>;
}

/// Non-interactive implementation: every checkpoint ends the run.
pub struct NoHumanFeedback;

#[async_trait]
impl HumanFeedbackPort for NoHumanFeedback {
    async fn request_feedback(
        &self,
        _checkpoint: &Checkpoint<'_>,
    ) -> Result<Option<String>, HumanFeedbackError> {
        Ok(None)
    }
}
