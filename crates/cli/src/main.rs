use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use events::SignalBus;
use sequencer::{SequenceEngine, SequenceSnapshot, SessionGuard};
use sequencer_core::ContextToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod console;

use config::{SequencerConfig, CONFIG_DIR, CONFIG_FILE};
use console::ConsolePresenter;

#[derive(Parser)]
#[command(name = "prompt-sequencer")]
#[command(about = "Show interruptive prompts one at a time, in order", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (defaults to .prompt-sequencer/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init,
    /// Run one sequencing session
    Run {
        /// Scope name passed to oracles and presenters
        #[arg(long)]
        scope: Option<String>,

        /// Dismiss prompts automatically after this many milliseconds
        #[arg(long)]
        auto_dismiss_ms: Option<u64>,

        /// Print the final snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the configured sequence and availability
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = match cli.config {
        Some(path) => path,
        None => std::env::current_dir()?.join(CONFIG_DIR).join(CONFIG_FILE),
    };

    match cli.command {
        Some(Commands::Init) => init_config(&config_path).await,
        Some(Commands::Run {
            scope,
            auto_dismiss_ms,
            json,
        }) => run(&config_path, scope, auto_dismiss_ms, json).await,
        Some(Commands::Status) => status(&config_path).await,
        None => run(&config_path, None, None, false).await,
    }
}

async fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        println!("Config already exists at {}", path.display());
        return Ok(());
    }

    SequencerConfig::default()
        .write(path)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Created {}", path.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit [availability] to choose which prompts may show");
    println!("  2. Run 'prompt-sequencer run'");

    Ok(())
}

async fn run(
    config_path: &Path,
    scope: Option<String>,
    auto_dismiss_ms: Option<u64>,
    json: bool,
) -> Result<()> {
    let config = SequencerConfig::load(config_path).await?;

    let bus = SignalBus::new();
    let mut presenter = ConsolePresenter::new(bus.clone());
    let auto_dismiss = auto_dismiss_ms
        .map(Duration::from_millis)
        .or_else(|| config.auto_dismiss());
    if let Some(delay) = auto_dismiss {
        presenter = presenter.with_auto_dismiss(delay, config.auto_action()?);
    }

    let engine = SequenceEngine::new(
        bus,
        config.engine_config()?,
        Arc::new(config.oracle()?),
        Arc::new(presenter),
    )?;

    let context = ContextToken::new(scope.unwrap_or_else(|| config.session.scope.clone()));
    tracing::info!(
        session_id = %context.session_id,
        scope = %context.scope,
        "Session started"
    );

    let session = SessionGuard::start(engine, context)?;
    let snapshot = await_session(session, tokio::signal::ctrl_c()).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_summary(&snapshot);
    }

    Ok(())
}

/// Wait for the session to complete, or fail if `interrupt` resolves first.
/// Dropping the session on interrupt shuts the engine down.
async fn await_session<F>(session: SessionGuard, interrupt: F) -> Result<SequenceSnapshot>
where
    F: Future<Output = std::io::Result<()>>,
{
    tokio::select! {
        finished = session.finish() => Ok(finished?),
        signal = interrupt => {
            signal.context("Failed to listen for interrupt")?;
            println!();
            bail!("Session interrupted before the sequence completed");
        }
    }
}

fn print_summary(snapshot: &SequenceSnapshot) {
    println!();
    println!("Sequence complete");
    println!("════════════════════════════════════════");

    if snapshot.presented().is_empty() {
        println!("  No prompts were available.");
        return;
    }

    for (index, prompt) in snapshot.presented().iter().enumerate() {
        println!("  {}. {} ({})", index + 1, prompt.title(), prompt.as_str().dimmed());
    }
}

async fn status(config_path: &Path) -> Result<()> {
    if !config_path.exists() {
        println!("No config at {}, showing defaults.", config_path.display());
        println!("Run 'prompt-sequencer init' to create one.");
    }

    let config = SequencerConfig::load(config_path).await?;
    let oracle = config.oracle()?;

    println!();
    println!("Scope: {}", config.session.scope);
    match config.auto_dismiss() {
        Some(delay) => println!("Dismissal: automatic after {}ms", delay.as_millis()),
        None => println!("Dismissal: interactive"),
    }
    println!();
    println!("Sequence:");

    for (index, prompt) in config.sequence()?.iter().enumerate() {
        let marker = match oracle.answer(*prompt) {
            Some(true) => "✓".green(),
            Some(false) => "✗".red(),
            None => "?".yellow(),
        };
        println!("  {} {}. {}", marker, index + 1, prompt.as_str());
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "prompt_sequencer=debug,sequencer=debug,events=debug"
    } else {
        "prompt_sequencer=info,sequencer=warn"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}
