//! CLI entrypoint for roundtable
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use roundtable_application::{
    NoTranscript, RunCouncilInput, RunCouncilUseCase, TranscriptSink,
};
use roundtable_domain::{OutputFormat, Question};
use roundtable_infrastructure::{CommandAgentInvoker, ConfigLoader, FileConfig, JsonlTranscriptSink};
use roundtable_presentation::{Cli, ConsoleFormatter, InteractiveHumanFeedback, ProgressReporter};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(&cli)?;

    info!("Starting roundtable");

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        let config = load_config(&cli)?;
        println!();
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    let config = load_config(&cli)?;
    let warnings = config.validate()?;
    for issue in &warnings {
        warn!("{}", issue);
    }

    let query = match cli.query.clone() {
        Some(q) => q,
        None => read_query()?,
    };
    let question = Question::new(query)?;

    // === Dependency Injection ===
    let roster = config.council.to_roster()?;
    let policy = config.policy();
    let invoker = CommandAgentInvoker::new(config.council.commands());

    let transcript: Arc<dyn TranscriptSink> = if config.transcript.enabled {
        match JsonlTranscriptSink::start_run(&config.transcript.directory) {
            Some(sink) => {
                info!(path = %sink.path().display(), "Writing transcript");
                Arc::new(sink)
            }
            None => Arc::new(NoTranscript),
        }
    } else {
        Arc::new(NoTranscript)
    };

    let format = config.output.format.unwrap_or_default();
    let live_progress = !cli.quiet && format != OutputFormat::Json;
    let human = InteractiveHumanFeedback::new()
        .with_cycle_messages(!live_progress)
        .with_stderr(format == OutputFormat::Json);

    let use_case = RunCouncilUseCase::new(Arc::new(invoker))
        .with_human_feedback(Arc::new(human))
        .with_transcript(transcript)
        .with_behavior(config.behavior.to_behavior());

    let input = RunCouncilInput::new(question, roster).with_policy(policy);

    if live_progress {
        println!();
        println!("+============================================================+");
        println!("|           Roundtable - Agent Council                       |");
        println!("+============================================================+");
        println!();
        println!(
            "Agents: {}",
            input
                .roster
                .ids()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!("Chair:  {}", input.roster.chair().id);
        println!();
    }

    let output = if live_progress {
        let progress = ProgressReporter::new();
        use_case.execute_with_progress(input, &progress).await?
    } else {
        use_case.execute(input).await?
    };

    let text = match format {
        OutputFormat::Full => ConsoleFormatter::format(&output),
        OutputFormat::Answer => ConsoleFormatter::format_answer(&output),
        OutputFormat::Json => ConsoleFormatter::format_json(&output),
    };
    println!("{}", text);

    Ok(())
}

/// Install the tracing subscriber; `RUST_LOG` overrides the `-v` level
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(io::stderr)
        .with_filter(filter());

    let (file_layer, guard) = match &cli.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "roundtable.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {}", e))?;

    Ok(guard)
}

/// Merge configuration sources, then apply command-line overrides
fn load_config(cli: &Cli) -> Result<FileConfig> {
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("failed to load configuration: {}", e))?
    };

    if let Some(max) = cli.max_iterations {
        config.discussion.max_iterations = max;
    }
    if let Some(cycles) = cli.max_cycles {
        config.discussion.max_cycles = Some(cycles);
    }
    if cli.rotate {
        config.discussion.rotate_opener = true;
    }
    if let Some(command) = &cli.command {
        config.council.default_command = Some(command.clone());
    }
    if cli.no_transcript {
        config.transcript.enabled = false;
    }
    if let Some(dir) = &cli.transcript_dir {
        config.transcript.directory = dir.clone();
    }
    if let Some(format) = cli.output {
        config.output.format = Some(format);
    }

    Ok(config)
}

/// Prompt for the query when none was given on the command line
fn read_query() -> Result<String> {
    print!("Enter your query: ");
    io::stdout().flush()?;

    let mut query = String::new();
    io::stdin()
        .lock()
        .read_line(&mut query)
        .context("failed to read query")?;

    let query = query.trim();
    if query.is_empty() {
        bail!("A query is required. Pass it as an argument or type it at the prompt.");
    }
    Ok(query.to_string())
}
