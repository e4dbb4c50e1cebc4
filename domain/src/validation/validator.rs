//! Candidate message validation
//!
//! Every agent reply passes through [`MessageValidator::validate`] before
//! it may enter the message store. Checks run in a fixed order and all
//! findings are reported:
//!
//! 1. impersonation of another participant
//! 2. the format the current phase requires
//! 3. empty content

use super::schema::FinalAnswerSchema;
use super::violation::{ValidationResult, Violation};
use crate::agent::AgentId;
use crate::conversation::{HUMAN_LABEL, Message, Role, USER_LABEL};
use crate::core::string::{labeled_line, strip_markdown_prefix};
use crate::orchestration::state::PhaseKind;
use crate::quorum::parse_vote;

/// Validates agent replies against the participants of one run
#[derive(Debug, Clone)]
pub struct MessageValidator {
    participants: Vec<AgentId>,
    schema: FinalAnswerSchema,
}

impl MessageValidator {
    pub fn new(participants: impl IntoIterator<Item = AgentId>, schema: FinalAnswerSchema) -> Self {
        Self {
            participants: participants.into_iter().collect(),
            schema,
        }
    }

    pub fn schema(&self) -> &FinalAnswerSchema {
        &self.schema
    }

    pub fn validate(
        &self,
        candidate: &str,
        speaker: &AgentId,
        prior_history: &[Message],
        phase_kind: PhaseKind,
    ) -> ValidationResult {
        let mut violations = Vec::new();
        let is_empty = candidate.trim().is_empty();

        if let Some(impersonated) = self.find_impersonation(candidate, speaker, prior_history) {
            violations.push(Violation::Impersonation { impersonated });
        }

        // An empty reply is reported as such rather than as missing sections.
        if !is_empty && let Some(missing) = self.missing_format(candidate, phase_kind) {
            violations.push(Violation::Format { missing });
        }

        if is_empty {
            violations.push(Violation::EmptyContent);
        }

        ValidationResult::from_violations(violations)
    }

    /// Name of the first participant the candidate speaks for, if any
    fn find_impersonation(
        &self,
        candidate: &str,
        speaker: &AgentId,
        prior_history: &[Message],
    ) -> Option<String> {
        let human_seen = prior_history.iter().any(|m| m.role == Role::Human);
        let user_seen = prior_history.iter().any(|m| m.role == Role::User);

        candidate.lines().find_map(|line| {
            let (label, _) = labeled_line(strip_markdown_prefix(line))?;

            if let Some(other) = self
                .participants
                .iter()
                .find(|id| *id != speaker && id.matches(label))
            {
                return Some(other.to_string());
            }
            if human_seen && label.eq_ignore_ascii_case(HUMAN_LABEL) {
                return Some(HUMAN_LABEL.to_string());
            }
            if user_seen && label.eq_ignore_ascii_case(USER_LABEL) {
                return Some(USER_LABEL.to_string());
            }
            None
        })
    }

    fn missing_format(&self, candidate: &str, phase_kind: PhaseKind) -> Option<Vec<String>> {
        match phase_kind {
            PhaseKind::Consensus => parse_vote(candidate)
                .err()
                .map(|e| vec![format!("{} ({})", e.missing_part(), e)]),
            PhaseKind::FinalAnswer => {
                let missing = self.schema.missing_sections(candidate);
                (!missing.is_empty()).then_some(missing)
            }
            PhaseKind::Discussion | PhaseKind::AwaitingHuman | PhaseKind::Terminated => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> MessageValidator {
        MessageValidator::new(
            [AgentId::new("agent1"), AgentId::new("agent2")],
            FinalAnswerSchema::default(),
        )
    }

    fn history() -> Vec<Message> {
        vec![Message::user("Design a cache", 0, 0)]
    }

    fn me() -> AgentId {
        AgentId::new("agent1")
    }

    #[test]
    fn test_plain_discussion_accepted() {
        let result = validator().validate(
            "I suggest an LRU cache.\nTrade-off: memory vs hit rate.",
            &me(),
            &history(),
            PhaseKind::Discussion,
        );
        assert!(result.accepted);
        assert!(result.violations.is_empty());
    }

    #[test]
    fn test_other_agent_prefix_rejected() {
        let result = validator().validate(
            "My idea is X.\nagent2: I agree completely!",
            &me(),
            &history(),
            PhaseKind::Discussion,
        );
        assert!(!result.accepted);
        assert_eq!(
            result.primary(),
            Some(&Violation::Impersonation {
                impersonated: "agent2".to_string()
            })
        );
    }

    #[test]
    fn test_decorated_prefixes_rejected() {
        for candidate in [
            "**Agent2**: sounds good",
            "[agent2] sounds good",
            "> agent2: sounds good",
            "- **agent2:** sounds good",
        ] {
            let result = validator().validate(candidate, &me(), &history(), PhaseKind::Discussion);
            assert!(!result.accepted, "should reject {candidate:?}");
        }
    }

    #[test]
    fn test_own_prefix_allowed() {
        let result = validator().validate(
            "agent1: here is my take",
            &me(),
            &history(),
            PhaseKind::Discussion,
        );
        assert!(result.accepted);
    }

    #[test]
    fn test_mention_is_not_impersonation() {
        let result = validator().validate(
            "As agent2 said: caching helps.",
            &me(),
            &history(),
            PhaseKind::Discussion,
        );
        assert!(result.accepted);
    }

    #[test]
    fn test_human_label_only_after_human_spoke() {
        let candidate = "Human: please continue";
        let before = validator().validate(candidate, &me(), &history(), PhaseKind::Discussion);
        assert!(before.accepted);

        let mut with_human = history();
        with_human.push(Message::human("more detail please", 0, 1));
        let after = validator().validate(candidate, &me(), &with_human, PhaseKind::Discussion);
        assert_eq!(
            after.primary(),
            Some(&Violation::Impersonation {
                impersonated: "Human".to_string()
            })
        );
    }

    #[test]
    fn test_user_label_rejected() {
        let result =
            validator().validate("User: thanks!", &me(), &history(), PhaseKind::Discussion);
        assert_eq!(result.primary().map(Violation::kind_name), Some("ImpersonationViolation"));
    }

    #[test]
    fn test_empty_content() {
        let result = validator().validate("  \n ", &me(), &history(), PhaseKind::Consensus);
        assert_eq!(result.violations, vec![Violation::EmptyContent]);
    }

    #[test]
    fn test_consensus_requires_vote() {
        let result = validator().validate(
            "I like it.",
            &me(),
            &history(),
            PhaseKind::Consensus,
        );
        assert!(!result.accepted);
        assert!(matches!(result.primary(), Some(Violation::Format { missing }) if missing[0].starts_with("VOTE")));

        let result = validator().validate(
            "VOTE: APPROVE\nJUSTIFICATION: complete",
            &me(),
            &history(),
            PhaseKind::Consensus,
        );
        assert!(result.accepted);
    }

    #[test]
    fn test_final_answer_requires_sections() {
        let result = validator().validate(
            "## Summary\nDone.",
            &me(),
            &history(),
            PhaseKind::FinalAnswer,
        );
        assert_eq!(
            result.violations,
            vec![Violation::Format {
                missing: vec!["Final Answer".to_string()]
            }]
        );
    }

    #[test]
    fn test_all_violations_reported_in_order() {
        let result = validator().validate(
            "agent2: I approve",
            &me(),
            &history(),
            PhaseKind::Consensus,
        );
        let kinds: Vec<_> = result.violations.iter().map(Violation::kind_name).collect();
        assert_eq!(kinds, vec!["ImpersonationViolation", "FormatViolation"]);
    }
}
