//! Interactive human feedback for discussion checkpoints.
//!
//! At the end of every cycle the user sees:
//!
//! ```text
//! ═══════════════════════════════════════════════════════════════
//!   Checkpoint: cycle 1 complete
//! ═══════════════════════════════════════════════════════════════
//!
//! Last vote: round 1 NOT REACHED [●○]
//!   └─ agent2: Misses the error path
//!
//! Please provide feedback (press Enter to finish)
//! feedback>
//! ```
//!
//! A blank line ends the run; Ctrl+D is reported as
//! [`HumanFeedbackError::Cancelled`], which the driver also treats as the end.

use async_trait::async_trait;
use colored::Colorize;
use roundtable_application::{Checkpoint, HumanFeedbackError, HumanFeedbackPort};
use roundtable_domain::core::string::truncate;
use std::io::{self, BufRead, Write};

pub const FEEDBACK_PROMPT: &str = "Please provide feedback (press Enter to finish)";

/// Terminal-based [`HumanFeedbackPort`] reading one line from stdin.
///
/// Checkpoint output goes to stdout unless [`with_stderr`] is set, which
/// keeps stdout clean for machine-readable results.
///
/// [`with_stderr`]: InteractiveHumanFeedback::with_stderr
pub struct InteractiveHumanFeedback {
    show_cycle_messages: bool,
    use_stderr: bool,
}

impl InteractiveHumanFeedback {
    pub fn new() -> Self {
        Self {
            show_cycle_messages: false,
            use_stderr: false,
        }
    }

    /// Reprint the cycle's messages at the checkpoint (for runs without
    /// live progress output)
    pub fn with_cycle_messages(mut self, show: bool) -> Self {
        self.show_cycle_messages = show;
        self
    }

    /// Write the checkpoint banner, vote summary and prompt to stderr
    pub fn with_stderr(mut self, use_stderr: bool) -> Self {
        self.use_stderr = use_stderr;
        self
    }

    fn output(&self) -> Box<dyn Write> {
        if self.use_stderr {
            Box::new(io::stderr())
        } else {
            Box::new(io::stdout())
        }
    }

    fn render_checkpoint(
        &self,
        out: &mut impl Write,
        checkpoint: &Checkpoint<'_>,
    ) -> io::Result<()> {
        let rule = "═══════════════════════════════════════════════════════════════";
        writeln!(out)?;
        writeln!(out, "{}", rule.yellow().bold())?;
        writeln!(
            out,
            "{}",
            format!("  Checkpoint: cycle {} complete", checkpoint.phase + 1)
                .yellow()
                .bold()
        )?;
        writeln!(out, "{}", rule.yellow().bold())?;
        writeln!(out)?;

        if self.show_cycle_messages {
            for message in checkpoint
                .history
                .iter()
                .filter(|m| m.cycle == checkpoint.phase && m.role.is_agent())
            {
                writeln!(out, "{}", format!("── {} ──", message.role).cyan().bold())?;
                writeln!(out, "{}", message.content)?;
                writeln!(out)?;
            }
        }

        if let Some(round) = checkpoint.latest_round {
            let status = if round.is_reached() {
                "REACHED".green()
            } else {
                "NOT REACHED".red()
            };
            writeln!(
                out,
                "Last vote: round {} {} {}",
                round.round,
                status,
                round.vote_summary()
            )?;
            for vote in round.votes.iter().filter(|v| !v.is_approval()) {
                writeln!(
                    out,
                    "  └─ {}: {}",
                    vote.agent.as_str().dimmed(),
                    truncate(&vote.justification, 80)
                )?;
            }
            writeln!(out)?;
        }

        writeln!(out, "{}", FEEDBACK_PROMPT.cyan().bold())?;
        write!(out, "{} ", "feedback>".magenta().bold())?;
        out.flush()
    }
}

impl Default for InteractiveHumanFeedback {
    fn default() -> Self {
        Self::new()
    }
}

/// Read one line of feedback. EOF cancels; a blank line means no feedback.
fn read_feedback(reader: &mut impl BufRead) -> Result<Option<String>, HumanFeedbackError> {
    let mut input = String::new();
    let read = reader
        .read_line(&mut input)
        .map_err(|e| HumanFeedbackError::IoError(format!("Failed to read input: {}", e)))?;

    if read == 0 {
        return Err(HumanFeedbackError::Cancelled);
    }

    let input = input.trim();
    Ok((!input.is_empty()).then(|| input.to_string()))
}

#[async_trait]
impl HumanFeedbackPort for InteractiveHumanFeedback {
    async fn request_feedback(
        &self,
        checkpoint: &Checkpoint<'_>,
    ) -> Result<Option<String>, HumanFeedbackError> {
        self.render_checkpoint(&mut self.output(), checkpoint)
            .map_err(|e| {
                HumanFeedbackError::IoError(format!("Failed to write prompt: {}", e))
            })?;

        read_feedback(&mut io::stdin().lock())
    }
}
