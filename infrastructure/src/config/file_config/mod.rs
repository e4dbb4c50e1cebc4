//! Configuration file schema for roundtable
//!
//! Every section is optional; missing keys fall back to defaults.

mod council;
mod discussion;
mod output;

pub use council::{FileAgentConfig, FileCouncilConfig};
pub use discussion::{FileConsensusConfig, FileDiscussionConfig, FileFinalAnswerConfig, to_policy};
pub use output::{FileBehaviorConfig, FileOutputConfig, FileTranscriptConfig};

use roundtable_domain::{ConfigIssue, CouncilPolicy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration rejected by [`FileConfig::validate`]
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("invalid configuration:\n{}", format_issues(.0))]
    Invalid(Vec<ConfigIssue>),
}

fn format_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("  {}", issue))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Complete configuration as read from TOML files and the environment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub council: FileCouncilConfig,
    pub discussion: FileDiscussionConfig,
    pub consensus: FileConsensusConfig,
    pub final_answer: FileFinalAnswerConfig,
    pub behavior: FileBehaviorConfig,
    pub transcript: FileTranscriptConfig,
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Every problem found, errors and warnings alike
    pub fn issues(&self) -> Vec<ConfigIssue> {
        let mut issues = self.council.issues();
        issues.extend(discussion::issues(
            &self.discussion,
            &self.consensus,
            &self.final_answer,
            self.council.agents.len(),
        ));
        issues
    }

    /// Fail on any error-level issue; otherwise return the warnings
    pub fn validate(&self) -> Result<Vec<ConfigIssue>, ConfigValidationError> {
        let (errors, warnings): (Vec<_>, Vec<_>) =
            self.issues().into_iter().partition(ConfigIssue::is_error);
        if errors.is_empty() {
            Ok(warnings)
        } else {
            Err(ConfigValidationError::Invalid(errors))
        }
    }

    pub fn policy(&self) -> CouncilPolicy {
        to_policy(&self.discussion, &self.consensus, &self.final_answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_domain::ConfigIssueCode;

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[council]
default_command = "cat"

[discussion]
max_iterations = 2
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.council.agents.len(), 2);
        assert_eq!(config.discussion.max_iterations, 2);
        assert!(config.transcript.enabled);
        assert!(config.validate().unwrap().is_empty());
    }

    #[test]
    fn test_validate_collects_errors() {
        let toml_str = r#"
[council]
chair = "ghost"

[discussion]
max_iterations = 0
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let Err(ConfigValidationError::Invalid(errors)) = config.validate() else {
            panic!("expected validation failure");
        };
        let codes: Vec<_> = errors.iter().map(|i| i.code).collect();
        assert!(codes.contains(&ConfigIssueCode::MissingCommand));
        assert!(codes.contains(&ConfigIssueCode::UnknownChair));
        assert!(codes.contains(&ConfigIssueCode::ZeroIterations));
        assert!(errors.iter().all(ConfigIssue::is_error));
    }

    #[test]
    fn test_validate_returns_warnings() {
        let toml_str = r#"
[council]
default_command = "cat"

[final_answer]
required_sections = []
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let warnings = config.validate().unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, ConfigIssueCode::EmptyFinalAnswerSchema);
    }

    #[test]
    fn test_error_display_lists_issues() {
        let config = FileConfig::default();
        let error = config.validate().unwrap_err();
        let text = error.to_string();
        assert!(text.starts_with("invalid configuration:"));
        assert!(text.contains("error: council.agents.agent1"));
    }
}
