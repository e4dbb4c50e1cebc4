//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation adapters
//! must implement.

pub mod agent_invoker;
pub mod human_feedback;
pub mod progress;
pub mod transcript;
