//! Message validation: impersonation, phase format and emptiness checks.

pub mod schema;
pub mod validator;
pub mod violation;

pub use schema::{DEFAULT_REQUIRED_SECTIONS, FinalAnswerSchema};
pub use validator::MessageValidator;
pub use violation::{ValidationResult, Violation};
