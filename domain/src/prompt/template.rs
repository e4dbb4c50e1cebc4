//! Prompt templates for the council flow

use crate::agent::{AgentProfile, AgentRoster};
use crate::conversation::Message;
use crate::quorum::ConsensusRound;
use crate::validation::{FinalAnswerSchema, ValidationResult};

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for an agent: its role plus the rules of the table
    pub fn system_prompt(agent: &AgentProfile, roster: &AgentRoster) -> String {
        let others: Vec<&str> = roster.others(&agent.id).map(|id| id.as_str()).collect();

        format!(
            r#"{role}

You are {name}, one participant in a moderated discussion with {others}.
A human moderator reviews the conversation between rounds.

Rules:
- Speak only as {name}. Write your own contribution and nothing else.
- Never write lines on behalf of another participant. Do not start a line
  with another participant's name followed by a colon, and do not put a
  name in brackets at the start of a line (for example "{example}:" or
  "[Human]").
- Do not invent replies from the human moderator.
- Build on what has already been said instead of repeating it."#,
            role = agent.role_prompt.trim(),
            name = agent.id,
            others = others.join(", "),
            example = others.first().copied().unwrap_or("agent2"),
        )
    }

    /// Render the shared history as a plain-text transcript
    pub fn render_transcript(history: &[Message]) -> String {
        history
            .iter()
            .map(|m| format!("[{}]\n{}", m.speaker(), m.content.trim()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Instruction for a discussion turn
    pub fn discussion_instruction(
        agent: &AgentProfile,
        iteration: u32,
        max_iterations: u32,
        latest_round: Option<&ConsensusRound>,
        readiness_marker: Option<&str>,
    ) -> String {
        let mut prompt = format!(
            "It is your turn, {}. This is turn {} of {} before the moderator reviews the discussion.\n\
             Continue the conversation above with your own contribution.",
            agent.id,
            iteration + 1,
            max_iterations
        );

        if let Some(round) = latest_round.filter(|r| !r.is_reached()) {
            prompt.push_str(&format!(
                "\n\nThe last vote did not reach consensus ({}, {}). Address these objections:\n{}",
                round.outcome,
                round.vote_summary(),
                round.dissent_feedback()
            ));
        }

        if let Some(marker) = readiness_marker {
            prompt.push_str(&format!(
                "\n\nWhen you believe the group has converged on an answer, include the phrase \"{}\" in your message.",
                marker
            ));
        }

        prompt
    }

    /// Instruction for a consensus vote on `proposal`
    pub fn vote_instruction(proposal: &str) -> String {
        format!(
            r#"The discussion is moving to a vote. Evaluate the following proposal on its own merits:

---
{}
---

Respond in exactly this format:

VOTE: APPROVE | REJECT | ABSTAIN
JUSTIFICATION: <why you vote this way>

Approve only if you independently agree that the proposal answers the original question."#,
            proposal.trim()
        )
    }

    /// Instruction for the chair to write the final answer
    pub fn final_answer_instruction(schema: &FinalAnswerSchema) -> String {
        let sections = schema
            .required_sections
            .iter()
            .map(|s| format!("## {}", s))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "The participants reached consensus. As chair, write the final answer to the original question.\n\
             Use these section headings, in this order:\n\n{}",
            sections
        )
    }

    /// Notice prepended to a retried turn
    pub fn retry_notice(result: &ValidationResult) -> String {
        let issues = result
            .violations
            .iter()
            .map(|v| format!("- {}", v))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "Your previous reply was rejected and has not been added to the conversation:\n{}\n\
             Reply again, speaking only as yourself and following the requested format.",
            issues
        )
    }

    /// Plain-text rendering of a full request, for agents reached through a
    /// text pipe
    pub fn render_request(
        system_prompt: &str,
        history: &[Message],
        instruction: &str,
        retry_notice: Option<&str>,
    ) -> String {
        let mut prompt = format!(
            "### System\n{}\n\n### Conversation\n{}\n\n",
            system_prompt,
            Self::render_transcript(history)
        );
        if let Some(notice) = retry_notice {
            prompt.push_str(&format!("### Notice\n{}\n\n", notice));
        }
        prompt.push_str(&format!("### Instruction\n{}\n", instruction));
        prompt
    }
}
