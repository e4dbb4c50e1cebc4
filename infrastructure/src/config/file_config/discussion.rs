//! Discussion, consensus and final-answer configuration
//!
//! ```toml
//! [discussion]
//! max_iterations = 4
//! max_retries = 2
//! rotate_opener = true
//! max_cycles = 6
//!
//! [consensus]
//! after_phase = 2
//! readiness_marker = "READY FOR CONSENSUS"
//! max_abstentions = 0
//!
//! [final_answer]
//! required_sections = ["Summary", "Final Answer"]
//! ```

use roundtable_domain::orchestration::{
    DEFAULT_MAX_ITERATIONS, DEFAULT_MAX_RETRIES, DEFAULT_READINESS_MARKER,
};
use roundtable_domain::validation::DEFAULT_REQUIRED_SECTIONS;
use roundtable_domain::{
    ConfigIssue, ConfigIssueCode, ConsensusTrigger, CouncilPolicy, FinalAnswerSchema,
};
use serde::{Deserialize, Serialize};

/// Raw discussion configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDiscussionConfig {
    /// Agent turns per cycle
    pub max_iterations: u32,
    /// Extra attempts after a rejected or failed turn
    pub max_retries: u32,
    /// Rotate the opening speaker with each cycle
    pub rotate_opener: bool,
    /// Stop after this many feedback cycles (unbounded when omitted)
    pub max_cycles: Option<u32>,
}

impl Default for FileDiscussionConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_retries: DEFAULT_MAX_RETRIES,
            rotate_opener: false,
            max_cycles: None,
        }
    }
}

/// Raw consensus configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConsensusConfig {
    /// Vote once this many feedback cycles have completed
    pub after_phase: Option<u32>,
    /// Marker that requests a vote; an empty string disables it
    pub readiness_marker: String,
    /// Abstentions tolerated before a round counts as insufficient
    pub max_abstentions: usize,
}

impl Default for FileConsensusConfig {
    fn default() -> Self {
        Self {
            after_phase: None,
            readiness_marker: DEFAULT_READINESS_MARKER.to_string(),
            max_abstentions: 0,
        }
    }
}

impl FileConsensusConfig {
    pub fn to_trigger(&self) -> ConsensusTrigger {
        let trigger = ConsensusTrigger::disabled().with_readiness_marker(&self.readiness_marker);
        match self.after_phase {
            Some(phase) => trigger.with_after_phase(phase),
            None => trigger,
        }
    }
}

/// Raw final-answer configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileFinalAnswerConfig {
    pub required_sections: Vec<String>,
}

impl Default for FileFinalAnswerConfig {
    fn default() -> Self {
        Self {
            required_sections: DEFAULT_REQUIRED_SECTIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl FileFinalAnswerConfig {
    pub fn to_schema(&self) -> FinalAnswerSchema {
        FinalAnswerSchema::new(self.required_sections.iter().map(String::as_str))
    }
}

/// Assemble the run policy from the three sections
pub fn to_policy(
    discussion: &FileDiscussionConfig,
    consensus: &FileConsensusConfig,
    final_answer: &FileFinalAnswerConfig,
) -> CouncilPolicy {
    CouncilPolicy::new()
        .with_max_iterations(discussion.max_iterations)
        .with_max_retries(discussion.max_retries)
        .with_rotate_opener(discussion.rotate_opener)
        .with_max_cycles(discussion.max_cycles)
        .with_trigger(consensus.to_trigger())
        .with_max_abstentions(consensus.max_abstentions)
        .with_final_answer(final_answer.to_schema())
}

pub(super) fn issues(
    discussion: &FileDiscussionConfig,
    consensus: &FileConsensusConfig,
    final_answer: &FileFinalAnswerConfig,
    agent_count: usize,
) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();

    if discussion.max_iterations == 0 {
        issues.push(ConfigIssue::error(
            ConfigIssueCode::ZeroIterations,
            "discussion.max_iterations must be at least 1",
        ));
    }

    if discussion.max_cycles == Some(0) {
        issues.push(ConfigIssue::error(
            ConfigIssueCode::ZeroCycles,
            "discussion.max_cycles must be at least 1 when set",
        ));
    }

    if let (Some(after), Some(cycles)) = (consensus.after_phase, discussion.max_cycles)
        && after > cycles
    {
        issues.push(ConfigIssue::warning(
            ConfigIssueCode::UnreachableConsensus,
            format!(
                "consensus.after_phase ({}) is beyond discussion.max_cycles ({}); \
                 the phase threshold can never trigger a vote",
                after, cycles
            ),
        ));
    }

    if agent_count >= 2 && consensus.max_abstentions >= agent_count - 1 {
        issues.push(ConfigIssue::warning(
            ConfigIssueCode::PermissiveAbstentions,
            format!(
                "consensus.max_abstentions ({}) lets a single approval carry a vote among {} agents",
                consensus.max_abstentions, agent_count
            ),
        ));
    }

    if final_answer.to_schema().required_sections.is_empty() {
        issues.push(ConfigIssue::warning(
            ConfigIssueCode::EmptyFinalAnswerSchema,
            "final_answer.required_sections is empty; any non-empty final answer is accepted",
        ));
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_domain::ConsensusEvaluator;

    #[test]
    fn test_default_policy_matches_domain_default() {
        let policy = to_policy(
            &FileDiscussionConfig::default(),
            &FileConsensusConfig::default(),
            &FileFinalAnswerConfig::default(),
        );
        assert_eq!(policy, CouncilPolicy::default());
    }

    #[test]
    fn test_policy_from_toml() {
        let toml_str = r#"
[discussion]
max_iterations = 3
rotate_opener = true
max_cycles = 4

[consensus]
after_phase = 2
readiness_marker = ""
max_abstentions = 1

[final_answer]
required_sections = ["Answer"]
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        let policy = config.policy();

        assert_eq!(policy.max_iterations, 3);
        assert_eq!(policy.max_retries, DEFAULT_MAX_RETRIES);
        assert!(policy.rotate_opener);
        assert_eq!(policy.max_cycles, Some(4));
        assert_eq!(policy.trigger.after_phase, Some(2));
        assert_eq!(policy.trigger.readiness_marker, None);
        assert_eq!(policy.evaluator, ConsensusEvaluator::new(1));
        assert_eq!(policy.final_answer.required_sections, vec!["Answer"]);
    }

    #[test]
    fn test_issues() {
        let discussion = FileDiscussionConfig {
            max_iterations: 0,
            max_cycles: Some(1),
            ..Default::default()
        };
        let consensus = FileConsensusConfig {
            after_phase: Some(3),
            max_abstentions: 1,
            ..Default::default()
        };
        let final_answer = FileFinalAnswerConfig {
            required_sections: vec![" ".to_string()],
        };

        let codes: Vec<_> = issues(&discussion, &consensus, &final_answer, 2)
            .into_iter()
            .map(|i| i.code)
            .collect();
        assert_eq!(
            codes,
            vec![
                ConfigIssueCode::ZeroIterations,
                ConfigIssueCode::UnreachableConsensus,
                ConfigIssueCode::PermissiveAbstentions,
                ConfigIssueCode::EmptyFinalAnswerSchema,
            ]
        );
    }

    #[test]
    fn test_zero_cycles_is_an_error() {
        let discussion = FileDiscussionConfig {
            max_cycles: Some(0),
            ..Default::default()
        };
        let issues = issues(
            &discussion,
            &FileConsensusConfig::default(),
            &FileFinalAnswerConfig::default(),
            2,
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ConfigIssueCode::ZeroCycles);
        assert!(issues[0].is_error());
    }

    #[test]
    fn test_defaults_have_no_issues() {
        let issues = issues(
            &FileDiscussionConfig::default(),
            &FileConsensusConfig::default(),
            &FileFinalAnswerConfig::default(),
            2,
        );
        assert!(issues.is_empty());
    }
}
