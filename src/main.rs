//! `shelfboard`: replay recorded product-row editing sessions.
//!
//! Reads a JSON script (initial template, catalog, UI events), feeds every
//! event through the drag engine and dialogs, and prints a report with the
//! outcome of each step and the final template.

mod config;
mod services;

use clap::{Args, Parser, Subcommand};

use crate::config::{ConfigError, OutputFormat, ShelfConfig};
use crate::services::replay::{self, ReplayError};

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Replay(#[from] ReplayError),
    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "shelfboard", about = "Product row template editor, headless")]
struct Cli {
    /// Log level: error, warn, info, debug or trace.
    #[arg(long, env = "SHELF_LOG")]
    log: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a script and print the report.
    Replay(ReplayArgs),
}

#[derive(Args, Debug)]
struct ReplayArgs {
    /// Script path, or `-` for stdin.
    #[arg(default_value = "-")]
    script: String,

    /// Single-line JSON output.
    #[arg(long)]
    compact: bool,

    /// Print only the final template.
    #[arg(long)]
    template_only: bool,
}

fn main() -> Result<(), AppError> {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    let log_level = cli.log.as_deref().map(|raw| config::parse_log_level(Some(raw))).transpose()?;
    let compact = matches!(&cli.command, Command::Replay(args) if args.compact);
    let config = ShelfConfig::from_env()?.with_overrides(log_level, compact);

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = dotenv {
        if !e.not_found() {
            tracing::warn!(error = %e, "failed to load .env");
        }
    }

    match cli.command {
        Command::Replay(args) => run_replay(&config, &args),
    }
}

fn run_replay(config: &ShelfConfig, args: &ReplayArgs) -> Result<(), AppError> {
    let script = replay::load_script(&args.script)?;
    tracing::info!(script = %args.script, events = script.events.len(), "replaying");
    let report = replay::replay(script);

    let json = match (args.template_only, config.output) {
        (true, OutputFormat::Pretty) => serde_json::to_string_pretty(&report.template)?,
        (true, OutputFormat::Compact) => serde_json::to_string(&report.template)?,
        (false, OutputFormat::Pretty) => serde_json::to_string_pretty(&report)?,
        (false, OutputFormat::Compact) => serde_json::to_string(&report)?,
    };
    println!("{json}");
    Ok(())
}
