//! CLI command definitions

use clap::Parser;
use roundtable_domain::OutputFormat;
use std::path::PathBuf;

/// CLI arguments for roundtable
#[derive(Parser, Debug)]
#[command(name = "roundtable")]
#[command(
    author,
    version,
    about = "Round-robin agent discussion with human checkpoints and consensus voting"
)]
#[command(long_about = r#"
Roundtable runs a council of agents that discuss a query in turn.

Each cycle:
1. Discussion: agents speak in a fixed order for --max-iterations turns
2. Checkpoint: you give feedback (or press Enter to end the run)
3. Consensus: when the discussion is ready, every agent votes on the
   latest proposal; a unanimous approval lets the chair write the
   final answer

Agents are shell commands that read the prompt on stdin and answer on stdout.

Configuration files are loaded from (in priority order):
1. ROUNDTABLE_<SECTION>__<KEY>   Environment variables
2. --config <path>               Explicit config file
3. ./roundtable.toml             Project-level config
4. ~/.config/roundtable/config.toml   Global config

Example:
  roundtable --command "my-llm --model small" "Design a rate limiter"
  roundtable --max-iterations 3 --rotate --output full "Review this plan"
"#)]
pub struct Cli {
    /// The query to discuss (read from stdin when omitted)
    pub query: Option<String>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and the merged configuration, then exit
    #[arg(long)]
    pub show_config: bool,

    /// Agent turns per discussion cycle
    #[arg(long, value_name = "N")]
    pub max_iterations: Option<u32>,

    /// Stop after this many feedback cycles
    #[arg(long, value_name = "N")]
    pub max_cycles: Option<u32>,

    /// Rotate the opening speaker with each cycle
    #[arg(long)]
    pub rotate: bool,

    /// Shell command for agents without their own command
    #[arg(long, value_name = "CMD")]
    pub command: Option<String>,

    /// Do not write a JSONL transcript
    #[arg(long)]
    pub no_transcript: bool,

    /// Directory for JSONL transcripts
    #[arg(long, value_name = "DIR")]
    pub transcript_dir: Option<PathBuf>,

    /// Output format (full, answer, json)
    #[arg(short, long, value_name = "FORMAT")]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Also write logs to a daily file in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::parse_from([
            "roundtable",
            "--max-iterations",
            "3",
            "--rotate",
            "--output",
            "json",
            "-vv",
            "--command",
            "cat",
            "What now?",
        ]);
        assert_eq!(cli.query.as_deref(), Some("What now?"));
        assert_eq!(cli.max_iterations, Some(3));
        assert!(cli.rotate);
        assert_eq!(cli.output, Some(OutputFormat::Json));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.command.as_deref(), Some("cat"));
        assert!(!cli.no_transcript);
    }

    #[test]
    fn test_unknown_output_format_rejected() {
        let result = Cli::try_parse_from(["roundtable", "--output", "xml", "q"]);
        assert!(result.is_err());
    }
}
