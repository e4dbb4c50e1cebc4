//! Presentation layer for roundtable
//!
//! This crate contains CLI definitions, output formatters,
//! progress reporters and the interactive checkpoint prompt.

pub mod cli;
pub mod feedback;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::Cli;
pub use feedback::InteractiveHumanFeedback;
pub use output::console::ConsoleFormatter;
pub use output::formatter::OutputFormatter;
pub use progress::reporter::{ProgressReporter, SimpleProgress};
