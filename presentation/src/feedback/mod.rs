//! Human feedback at discussion checkpoints

mod interactive;

pub use interactive::InteractiveHumanFeedback;
