//! Council configuration from TOML (`[council]` section)
//!
//! Example configuration:
//!
//! ```toml
//! [council]
//! chair = "architect"
//! default_command = "my-llm-cli --model small"
//!
//! [[council.agents]]
//! name = "architect"
//! role_prompt = "You design the overall solution."
//! temperature = 0.4
//!
//! [[council.agents]]
//! name = "critic"
//! role_prompt = "You look for flaws and missing cases."
//! command = "my-llm-cli --model large"
//! ```

use roundtable_domain::{
    AgentProfile, AgentRoster, ConfigIssue, ConfigIssueCode, DEFAULT_TEMPERATURE, DomainError,
    HUMAN_LABEL, MIN_AGENTS, USER_LABEL,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One agent entry (`[[council.agents]]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAgentConfig {
    pub name: String,
    #[serde(default)]
    pub role_prompt: String,
    pub temperature: Option<f32>,
    /// Position in the turn order; declaration order when omitted
    pub turn_order: Option<usize>,
    /// Shell command that answers for this agent
    pub command: Option<String>,
}

impl FileAgentConfig {
    pub fn new(name: impl Into<String>, role_prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role_prompt: role_prompt.into(),
            temperature: None,
            turn_order: None,
            command: None,
        }
    }

    fn to_profile(&self, position: usize) -> AgentProfile {
        AgentProfile::new(self.name.trim(), self.role_prompt.clone())
            .with_temperature(self.temperature.unwrap_or(DEFAULT_TEMPERATURE))
            .with_turn_order(self.turn_order.unwrap_or(position))
    }
}

/// Raw council configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCouncilConfig {
    pub agents: Vec<FileAgentConfig>,
    /// Agent that writes the final answer (default: first in turn order)
    pub chair: Option<String>,
    /// Command for agents that do not name their own
    pub default_command: Option<String>,
}

impl Default for FileCouncilConfig {
    fn default() -> Self {
        Self {
            agents: vec![
                FileAgentConfig::new(
                    "agent1",
                    "You are a collaborative agent focused on problem-solving. \
                     Work with your partner to complete the task.",
                ),
                FileAgentConfig::new(
                    "agent2",
                    "You are a critical reviewer. \
                     Analyze and improve upon your partner's suggestions.",
                ),
            ],
            chair: None,
            default_command: None,
        }
    }
}

impl FileCouncilConfig {
    /// Build the roster. Fails on the same problems [`Self::issues`]
    /// reports as errors.
    pub fn to_roster(&self) -> Result<AgentRoster, DomainError> {
        let profiles = self
            .agents
            .iter()
            .enumerate()
            .map(|(i, agent)| agent.to_profile(i))
            .collect();
        let roster = AgentRoster::new(profiles)?;

        match self.chair.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            Some(chair) => roster.with_chair(chair),
            None => Ok(roster),
        }
    }

    /// Shell command per agent name, falling back to `default_command`
    pub fn commands(&self) -> HashMap<String, String> {
        self.agents
            .iter()
            .filter_map(|agent| {
                agent
                    .command
                    .as_ref()
                    .or(self.default_command.as_ref())
                    .filter(|c| !c.trim().is_empty())
                    .map(|c| (agent.name.trim().to_string(), c.clone()))
            })
            .collect()
    }

    pub(super) fn issues(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.agents.len() < MIN_AGENTS {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::TooFewAgents,
                format!(
                    "council.agents: at least {} agents are required, found {}",
                    MIN_AGENTS,
                    self.agents.len()
                ),
            ));
        }

        let mut seen = HashSet::new();
        for agent in &self.agents {
            let name = agent.name.trim();

            if name.is_empty() || name.contains(':') || name.contains('\n') {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::InvalidAgentName,
                    format!(
                        "council.agents: invalid name '{}' (must be non-empty without ':' or line breaks)",
                        agent.name
                    ),
                ));
            } else if [HUMAN_LABEL, USER_LABEL]
                .iter()
                .any(|label| name.eq_ignore_ascii_case(label))
            {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::InvalidAgentName,
                    format!(
                        "council.agents: '{}' is reserved for the human participants",
                        name
                    ),
                ));
            } else if !seen.insert(name.to_lowercase()) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::DuplicateAgent,
                    format!("council.agents: duplicate agent name '{}'", name),
                ));
            }

            if let Some(t) = agent.temperature
                && !(0.0..=2.0).contains(&t)
            {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::TemperatureOutOfRange,
                    format!("council.agents.{}: temperature {} is outside 0.0..=2.0", name, t),
                ));
            }

            if agent.role_prompt.trim().is_empty() {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::EmptyRolePrompt,
                    format!("council.agents.{}: role_prompt is empty", name),
                ));
            }
        }

        let has_default = self
            .default_command
            .as_ref()
            .is_some_and(|c| !c.trim().is_empty());
        for agent in &self.agents {
            let has_own = agent.command.as_ref().is_some_and(|c| !c.trim().is_empty());
            if !has_own && !has_default {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::MissingCommand,
                    format!(
                        "council.agents.{}: no command configured and no council.default_command",
                        agent.name.trim()
                    ),
                ));
            }
        }

        if let Some(chair) = self.chair.as_deref().map(str::trim).filter(|c| !c.is_empty())
            && !self
                .agents
                .iter()
                .any(|a| a.name.trim().eq_ignore_ascii_case(chair))
        {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::UnknownChair,
                format!("council.chair: '{}' is not a configured agent", chair),
            ));
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_domain::Severity;

    fn with_command(mut config: FileCouncilConfig) -> FileCouncilConfig {
        config.default_command = Some("cat".to_string());
        config
    }

    #[test]
    fn test_default_roster() {
        let roster = FileCouncilConfig::default().to_roster().unwrap();
        let names: Vec<_> = roster.ids().map(|id| id.to_string()).collect();
        assert_eq!(names, vec!["agent1", "agent2"]);
        assert_eq!(roster.chair().id.as_str(), "agent1");
    }

    #[test]
    fn test_default_needs_a_command() {
        let issues = FileCouncilConfig::default().issues();
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.code == ConfigIssueCode::MissingCommand));
        assert!(with_command(FileCouncilConfig::default()).issues().is_empty());
    }

    #[test]
    fn test_deserialize_agents() {
        let toml_str = r#"
[council]
chair = "critic"
default_command = "llm"

[[council.agents]]
name = "critic"
role_prompt = "Find flaws."
temperature = 0.2
turn_order = 1

[[council.agents]]
name = "builder"
role_prompt = "Build it."
turn_order = 0
command = "other-llm"
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        let roster = config.council.to_roster().unwrap();

        assert_eq!(roster.at(0).id.as_str(), "builder");
        assert_eq!(roster.at(1).id.as_str(), "critic");
        assert_eq!(roster.at(1).temperature, 0.2);
        assert_eq!(roster.chair().id.as_str(), "critic");

        let commands = config.council.commands();
        assert_eq!(commands["builder"], "other-llm");
        assert_eq!(commands["critic"], "llm");
    }

    #[test]
    fn test_issues() {
        let config = with_command(FileCouncilConfig {
            agents: vec![
                FileAgentConfig::new("a", "x"),
                FileAgentConfig::new("A", "y"),
                FileAgentConfig::new("bad:name", ""),
                FileAgentConfig {
                    temperature: Some(3.0),
                    ..FileAgentConfig::new("hot", "z")
                },
            ],
            chair: Some("nobody".to_string()),
            default_command: None,
        });

        let codes: Vec<_> = config.issues().into_iter().map(|i| (i.code, i.severity)).collect();
        assert!(codes.contains(&(ConfigIssueCode::DuplicateAgent, Severity::Error)));
        assert!(codes.contains(&(ConfigIssueCode::InvalidAgentName, Severity::Error)));
        assert!(codes.contains(&(ConfigIssueCode::EmptyRolePrompt, Severity::Warning)));
        assert!(codes.contains(&(ConfigIssueCode::TemperatureOutOfRange, Severity::Error)));
        assert!(codes.contains(&(ConfigIssueCode::UnknownChair, Severity::Error)));
    }

    #[test]
    fn test_reserved_names_rejected() {
        let config = with_command(FileCouncilConfig {
            agents: vec![
                FileAgentConfig::new("human", "x"),
                FileAgentConfig::new("User", "y"),
                FileAgentConfig::new("critic", "z"),
            ],
            ..Default::default()
        });

        let issues = config.issues();
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.code == ConfigIssueCode::InvalidAgentName && i.is_error()));
        assert!(matches!(config.to_roster(), Err(DomainError::InvalidAgent(_))));
    }

    #[test]
    fn test_single_agent_rejected() {
        let config = with_command(FileCouncilConfig {
            agents: vec![FileAgentConfig::new("solo", "alone")],
            ..Default::default()
        });
        assert_eq!(config.issues()[0].code, ConfigIssueCode::TooFewAgents);
        assert!(matches!(
            config.to_roster(),
            Err(DomainError::InsufficientAgents { .. })
        ));
    }
}
