//! Vote parsing for consensus rounds.
//!
//! Agents answer a vote request in one of two formats. Both are pure text
//! pattern matching with no I/O.
//!
//! 1. **JSON**: `{"vote": "approve", "justification": "..."}`
//! 2. **Labelled lines**:
//!
//! ```text
//! VOTE: APPROVE
//! JUSTIFICATION: The proposal answers the question and handles edge cases.
//! ```
//!
//! The justification may continue over the following lines.

use super::vote::VoteDecision;
use crate::core::string::{labeled_line, strip_markdown_prefix};
use thiserror::Error;

/// Why a vote could not be read from an agent's reply
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VoteParseError {
    #[error("no VOTE line found")]
    MissingDecision,

    #[error("unrecognised vote '{0}' (expected APPROVE, REJECT or ABSTAIN)")]
    UnknownDecision(String),

    #[error("no JUSTIFICATION given")]
    MissingJustification,
}

impl VoteParseError {
    /// The part of the vote format that is missing or wrong
    pub fn missing_part(&self) -> &'static str {
        match self {
            VoteParseError::MissingDecision | VoteParseError::UnknownDecision(_) => "VOTE",
            VoteParseError::MissingJustification => "JUSTIFICATION",
        }
    }
}

/// A decision and its justification, before it is attributed to an agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedVote {
    pub decision: VoteDecision,
    pub justification: String,
}

/// Parse a vote from an agent reply.
///
/// # Examples
///
/// ```
/// use roundtable_domain::quorum::{parse_vote, VoteDecision};
///
/// let vote = parse_vote("VOTE: REJECT\nJUSTIFICATION: Needs benchmarks.").unwrap();
/// assert_eq!(vote.decision, VoteDecision::Reject);
/// assert_eq!(vote.justification, "Needs benchmarks.");
///
/// let vote = parse_vote(r#"{"vote": "approve", "justification": "Solid"}"#).unwrap();
/// assert_eq!(vote.decision, VoteDecision::Approve);
///
/// assert!(parse_vote("I think it's fine").is_err());
/// ```
pub fn parse_vote(response: &str) -> Result<ParsedVote, VoteParseError> {
    if let Some(parsed) = parse_json_vote(response) {
        return parsed;
    }
    parse_labeled_vote(response)
}

fn parse_json_vote(response: &str) -> Option<Result<ParsedVote, VoteParseError>> {
    let start = response.find('{')?;
    let end = response[start..].rfind('}')?;
    let json_str = &response[start..start + end + 1];

    let parsed: serde_json::Value = serde_json::from_str(json_str).ok()?;
    let raw_vote = parsed
        .get("vote")
        .or_else(|| parsed.get("decision"))?
        .as_str()?;

    let decision = match raw_vote.parse::<VoteDecision>() {
        Ok(d) => d,
        Err(_) => return Some(Err(VoteParseError::UnknownDecision(raw_vote.to_string()))),
    };

    let justification = parsed
        .get("justification")
        .or_else(|| parsed.get("reasoning"))
        .and_then(|v| v.as_str())
        .map(str::trim)
        .unwrap_or_default();

    if justification.is_empty() {
        return Some(Err(VoteParseError::MissingJustification));
    }

    Some(Ok(ParsedVote {
        decision,
        justification: justification.to_string(),
    }))
}

fn parse_labeled_vote(response: &str) -> Result<ParsedVote, VoteParseError> {
    let mut decision: Option<Result<VoteDecision, String>> = None;
    let mut justification: Option<Vec<&str>> = None;

    for line in response.lines() {
        let label = labeled_line(strip_markdown_prefix(line));

        match label {
            Some((key, value)) if key.eq_ignore_ascii_case("vote") && decision.is_none() => {
                let word = value
                    .split_whitespace()
                    .next()
                    .unwrap_or_default()
                    .trim_matches(|c: char| !c.is_alphanumeric());
                decision = Some(word.parse().map_err(|_| word.to_string()));
            }
            Some((key, value))
                if key.eq_ignore_ascii_case("justification") && justification.is_none() =>
            {
                justification = Some(vec![value]);
            }
            _ => {
                if let Some(lines) = justification.as_mut() {
                    lines.push(line.trim());
                }
            }
        }
    }

    let decision = match decision {
        None => return Err(VoteParseError::MissingDecision),
        Some(Err(word)) => return Err(VoteParseError::UnknownDecision(word)),
        Some(Ok(d)) => d,
    };

    let justification = justification
        .map(|lines| lines.join("\n").trim().to_string())
        .unwrap_or_default();

    if justification.is_empty() {
        return Err(VoteParseError::MissingJustification);
    }

    Ok(ParsedVote {
        decision,
        justification,
    })
}
