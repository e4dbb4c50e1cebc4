//! Infrastructure layer for roundtable
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: shell-command agents, the JSONL transcript
//! and configuration file loading.

pub mod agents;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use agents::CommandAgentInvoker;
pub use config::{
    ConfigLoader, ConfigValidationError, FileAgentConfig, FileBehaviorConfig, FileConfig,
    FileConsensusConfig, FileCouncilConfig, FileDiscussionConfig, FileFinalAnswerConfig,
    FileOutputConfig, FileTranscriptConfig,
};
pub use logging::{JsonlTranscriptSink, transcript_file_name};
