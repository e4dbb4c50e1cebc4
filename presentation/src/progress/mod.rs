//! Progress reporters for council runs

pub mod reporter;
