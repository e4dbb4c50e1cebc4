//! Core domain concepts shared across all subdomains.
//!
//! - [`question::Question`] - the validated opening query
//! - [`error::DomainError`] - domain-level errors
//! - [`string`] - small text helpers

pub mod error;
pub mod question;
pub mod string;
