//! Agent adapters
//!
//! - [`CommandAgentInvoker`] - runs a shell command per agent, prompt on stdin

mod command;

pub use command::CommandAgentInvoker;
