//! Prompt domain
//!
//! Templates for the system prompt, the shared transcript and the per-turn
//! instructions of each phase.

mod template;

pub use template::PromptTemplate;
