//! Conversation domain: messages and the append-only store that owns them.

pub mod message;
pub mod store;

pub use message::{HUMAN_LABEL, Message, Role, USER_LABEL};
pub use store::MessageStore;
