//! Port for the conversation transcript.
//!
//! Defines the [`TranscriptSink`] trait for recording every appended message
//! and every vote to a durable, machine-readable transcript.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the
//! conversation itself.

use roundtable_domain::{Message, TokenUsage, Vote};

/// Port for recording the conversation.
///
/// The methods are intentionally synchronous and non-fallible so that a
/// broken transcript never disrupts the run; implementations log their own
/// failures.
pub trait TranscriptSink: Send + Sync {
    /// Record a message that was appended to the store, with the token
    /// usage of the turn that produced it.
    fn record(&self, message: &Message, usage: Option<TokenUsage>);

    /// Record a vote cast in consensus round `round`.
    fn record_vote(&self, round: usize, phase: u32, vote: &Vote);
}

/// No-op implementation for tests and when the transcript is disabled.
pub struct NoTranscript;

impl TranscriptSink for NoTranscript {
    fn record(&self, _message: &Message, _usage: Option<TokenUsage>) {}
    fn record_vote(&self, _round: usize, _phase: u32, _vote: &Vote) {}
}
