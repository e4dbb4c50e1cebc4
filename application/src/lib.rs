//! Application layer for roundtable
//!
//! This crate contains the run driver, port definitions, and application
//! configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::BehaviorConfig;
pub use ports::{
    agent_invoker::{
        AgentInvoker, AgentReply, AgentRequest, InvocationError, TurnFailure, TurnPurpose,
    },
    human_feedback::{Checkpoint, HumanFeedbackError, HumanFeedbackPort, NoHumanFeedback},
    progress::{CouncilProgressNotifier, NoProgress},
    transcript::{NoTranscript, TranscriptSink},
};
pub use use_cases::run_council::{
    RunCouncilError, RunCouncilInput, RunCouncilUseCase, RunOutput, Termination,
};
