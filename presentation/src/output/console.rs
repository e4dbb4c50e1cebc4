//! Console output formatter for council results

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use roundtable_application::{RunOutput, Termination};
use roundtable_domain::{ConsensusRound, Message, TokenUsage};
use serde::Serialize;

/// Formats run results for console display
pub struct ConsoleFormatter;

/// Shape of `--output json`
#[derive(Serialize)]
struct JsonReport<'a> {
    termination: Termination,
    phase: u32,
    messages: &'a [Message],
    consensus_rounds: &'a [ConsensusRound],
    final_answer: Option<&'a str>,
    usage: Vec<JsonUsage<'a>>,
    total_usage: TokenUsage,
}

#[derive(Serialize)]
struct JsonUsage<'a> {
    speaker: &'a str,
    input_tokens: u64,
    output_tokens: u64,
}

impl ConsoleFormatter {
    /// Format the complete run
    pub fn format(output: &RunOutput) -> String {
        let mut text = String::new();

        text.push_str(&Self::header("Roundtable Results"));
        text.push('\n');

        let mut phase = None;
        for message in output.messages() {
            if phase != Some(message.cycle) {
                phase = Some(message.cycle);
                text.push_str(&Self::section_header(&format!(
                    "Cycle {}",
                    message.cycle + 1
                )));
            }
            text.push_str(&format!(
                "\n{}\n{}\n",
                format!("── {} ──", message.role).yellow().bold(),
                message.content
            ));
        }

        let rounds = output.state.consensus_rounds();
        if !rounds.is_empty() {
            text.push_str(&Self::section_header("Consensus Rounds"));
            for round in rounds {
                let status = match round.outcome.reason() {
                    None => "REACHED".green().bold(),
                    Some(reason) => format!("NOT REACHED ({})", reason).red().bold(),
                };
                text.push_str(&format!(
                    "\nRound {} (after cycle {}): {} {}\n",
                    round.round,
                    round.phase,
                    status,
                    round.vote_summary()
                ));
                for vote in &round.votes {
                    text.push_str(&format!(
                        "  {} {}: {}\n",
                        vote.decision.symbol(),
                        vote.agent,
                        Self::indent(&vote.justification, "    ").trim_start()
                    ));
                }
            }
        }

        text.push_str(&Self::footer());
        text.push_str(&Self::format_summary(output));
        text
    }

    /// The final answer, or the last message when the run ended without one
    pub fn format_answer(output: &RunOutput) -> String {
        let mut text = String::new();

        match output.final_answer() {
            Some(answer) => {
                text.push_str(&format!(
                    "{}\n\n",
                    format!("=== Final Answer ({}) ===", answer.role).cyan().bold()
                ));
                text.push_str(&answer.content);
            }
            None => {
                text.push_str(&format!(
                    "{}\n\n",
                    "=== No final answer; last message ===".yellow().bold()
                ));
                if let Some(last) = output.state.store().last() {
                    text.push_str(&format!("[{}]\n{}", last.role, last.content));
                }
            }
        }
        text.push('\n');
        text.push_str(&Self::format_summary(output));
        text
    }

    /// Format as JSON
    pub fn format_json(output: &RunOutput) -> String {
        let usage = output
            .usage
            .iter()
            .map(|(speaker, usage)| JsonUsage {
                speaker,
                input_tokens: usage.input_tokens,
                output_tokens: usage.output_tokens,
            })
            .collect();
        let report = JsonReport {
            termination: output.termination,
            phase: output.state.phase(),
            messages: output.messages(),
            consensus_rounds: output.state.consensus_rounds(),
            final_answer: output.final_answer().map(|m| m.content.as_str()),
            usage,
            total_usage: output.usage.total(),
        };
        serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
    }

    /// Termination reason and token usage totals
    pub fn format_summary(output: &RunOutput) -> String {
        let mut text = String::new();
        text.push_str(&format!(
            "\n{} {} after {} feedback cycle(s), {} message(s)\n",
            "Run ended:".cyan().bold(),
            output.termination,
            output.state.phase(),
            output.messages().len()
        ));

        text.push_str(&format!("{}\n", "Token usage (estimated):".cyan().bold()));
        for (speaker, usage) in output.usage.iter() {
            text.push_str(&format!(
                "  {:<16} in {:>7}  out {:>7}\n",
                speaker, usage.input_tokens, usage.output_tokens
            ));
        }
        let total = output.usage.total();
        text.push_str(&format!(
            "  {:<16} in {:>7}  out {:>7}  total {}\n",
            "total".bold(),
            total.input_tokens,
            total.output_tokens,
            total.total()
        ));
        text
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_full(&self, output: &RunOutput) -> String {
        Self::format(output)
    }

    fn format_answer(&self, output: &RunOutput) -> String {
        Self::format_answer(output)
    }

    fn format_json(&self, output: &RunOutput) -> String {
        Self::format_json(output)
    }

    fn format_summary(&self, output: &RunOutput) -> String {
        Self::format_summary(output)
    }
}
