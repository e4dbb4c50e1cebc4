//! Agent domain module
//!
//! Agents are configuration-driven: a name, a role prompt and a sampling
//! temperature. The [`AgentRoster`] fixes their turn order for the run.

pub mod entities;
pub mod value_objects;

pub use entities::{AgentProfile, AgentRoster, DEFAULT_TEMPERATURE, MIN_AGENTS};
pub use value_objects::AgentId;
