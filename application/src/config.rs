//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave,
//! such as per-call timeouts for agent invocations.

use std::time::Duration;

/// Application behavior configuration.
///
/// Controls runtime behavior of use cases like the time limit for a single
/// agent invocation. A call that runs over the limit counts as a failed
/// attempt and goes through the normal retry bound.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BehaviorConfig {
    /// Maximum time to wait for an agent reply before timing out.
    pub timeout: Option<Duration>,
}

impl BehaviorConfig {
    /// Creates a BehaviorConfig with a timeout specified in seconds.
    pub fn with_timeout_seconds(seconds: u64) -> Self {
        Self {
            timeout: Some(Duration::from_secs(seconds)),
        }
    }

    /// Creates a BehaviorConfig from an optional timeout in seconds.
    ///
    /// If `seconds` is `None` or zero, no timeout is applied.
    pub fn from_timeout_seconds(seconds: Option<u64>) -> Self {
        Self {
            timeout: seconds.filter(|s| *s > 0).map(Duration::from_secs),
        }
    }
}
