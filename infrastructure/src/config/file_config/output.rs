//! Behavior, transcript and output configuration

use roundtable_application::BehaviorConfig;
use roundtable_domain::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw behavior configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBehaviorConfig {
    /// Seconds an agent may take per attempt (no limit when omitted or 0)
    pub timeout_seconds: Option<u64>,
}

impl FileBehaviorConfig {
    pub fn to_behavior(&self) -> BehaviorConfig {
        BehaviorConfig::from_timeout_seconds(self.timeout_seconds)
    }
}

/// Raw transcript configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTranscriptConfig {
    /// Write a JSONL transcript of every run
    pub enabled: bool,
    /// Directory transcripts are written to
    pub directory: PathBuf,
}

impl Default for FileTranscriptConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: PathBuf::from("conversation_logs"),
        }
    }
}

/// Raw output configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Output format (full, answer, json)
    pub format: Option<OutputFormat>,
    /// Enable colored output
    pub color: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_output_defaults() {
        let config = FileOutputConfig::default();
        assert!(config.format.is_none());
        assert!(config.color);
    }

    #[test]
    fn test_deserialize_output() {
        let config: FileOutputConfig = toml::from_str("format = \"json\"\ncolor = false").unwrap();
        assert_eq!(config.format, Some(OutputFormat::Json));
        assert!(!config.color);
    }

    #[test]
    fn test_transcript_defaults() {
        let config = FileTranscriptConfig::default();
        assert!(config.enabled);
        assert_eq!(config.directory, PathBuf::from("conversation_logs"));
    }

    #[test]
    fn test_behavior_timeout() {
        assert_eq!(FileBehaviorConfig::default().to_behavior().timeout, None);
        let config = FileBehaviorConfig {
            timeout_seconds: Some(30),
        };
        assert_eq!(config.to_behavior().timeout, Some(Duration::from_secs(30)));
    }
}
