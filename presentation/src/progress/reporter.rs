//! Progress reporting while a council runs

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use roundtable_application::{CouncilProgressNotifier, TurnFailure, TurnPurpose};
use roundtable_domain::{AgentId, ConsensusRound, Message, Role, Vote, VoteDecision};
use std::sync::Mutex;
use std::time::Duration;

/// Reports progress with a spinner per agent turn and prints every
/// accepted message as it lands
pub struct ProgressReporter {
    spinner: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn start_spinner(&self, prefix: String, message: String) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_prefix(prefix);
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut slot) = self.spinner.lock()
            && let Some(previous) = slot.replace(pb)
        {
            previous.finish_and_clear();
        }
    }

    fn clear_spinner(&self) {
        if let Ok(mut slot) = self.spinner.lock()
            && let Some(pb) = slot.take()
        {
            pb.finish_and_clear();
        }
    }

    fn purpose_label(purpose: TurnPurpose) -> &'static str {
        match purpose {
            TurnPurpose::Discussion => "is thinking",
            TurnPurpose::Vote => "is voting",
            TurnPurpose::FinalAnswer => "is writing the final answer",
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl CouncilProgressNotifier for ProgressReporter {
    fn on_turn_start(&self, agent: &AgentId, purpose: TurnPurpose, attempt: u32) {
        let message = if attempt > 1 {
            format!("{} (attempt {})", Self::purpose_label(purpose), attempt)
        } else {
            Self::purpose_label(purpose).to_string()
        };
        self.start_spinner(agent.to_string(), message);
    }

    fn on_message(&self, message: &Message) {
        self.clear_spinner();
        match &message.role {
            Role::Human => println!("{}", "✓ Feedback recorded".dimmed()),
            role => {
                println!(
                    "\n{}\n{}\n",
                    format!("── {} ──", role).yellow().bold(),
                    message.content
                );
            }
        }
    }

    fn on_attempt_failed(&self, agent: &AgentId, attempt: u32, failure: &TurnFailure) {
        self.clear_spinner();
        println!(
            "{} {} attempt {} rejected: {}",
            "!".yellow().bold(),
            agent,
            attempt,
            failure
        );
    }

    fn on_checkpoint(&self, _phase: u32) {
        self.clear_spinner();
    }

    fn on_consensus_start(&self, round: usize, _proposal: &str) {
        println!(
            "{}",
            format!("── Consensus round {} ──", round).cyan().bold()
        );
    }

    fn on_vote(&self, vote: &Vote) {
        self.clear_spinner();
        println!("  {} {}", decision_marker(vote.decision), vote.agent);
    }

    fn on_consensus_complete(&self, round: &ConsensusRound) {
        self.clear_spinner();
        let status = match round.outcome.reason() {
            None => "reached".green().bold(),
            Some(reason) => format!("not reached ({})", reason).red().bold(),
        };
        println!("  {} consensus {}\n", round.vote_summary(), status);
    }
}

fn decision_marker(decision: VoteDecision) -> colored::ColoredString {
    match decision {
        VoteDecision::Approve => "✓ APPROVE".green(),
        VoteDecision::Reject => "✗ REJECT".red(),
        VoteDecision::Abstain => "- ABSTAIN".yellow(),
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl CouncilProgressNotifier for SimpleProgress {
    fn on_turn_start(&self, agent: &AgentId, purpose: TurnPurpose, attempt: u32) {
        println!("{} {} ({}, attempt {})", "->".cyan(), agent, purpose, attempt);
    }

    fn on_message(&self, message: &Message) {
        println!("[{}]\n{}\n", message.role, message.content);
    }

    fn on_attempt_failed(&self, agent: &AgentId, attempt: u32, failure: &TurnFailure) {
        println!("  {} {} attempt {}: {}", "x".red(), agent, attempt, failure);
    }

    fn on_vote(&self, vote: &Vote) {
        println!("  {} {}: {}", vote.decision.symbol(), vote.agent, vote.decision);
    }

    fn on_consensus_complete(&self, round: &ConsensusRound) {
        println!("  round {} {}", round.round, round.vote_summary());
    }
}
