//! # grundton - Habitual Pitch Estimator
//!
//! Command-line front end for `grundton-core`. Records or analyzes a
//! session, keeps the summaries of past sessions in a JSON store and reports
//! the long-run dominant pitch class over all of them.
//!
//! ## Commands
//! - `record`: live microphone session (feature `mic`)
//! - `analyze`: the same pipeline over a WAV file
//! - `sessions`: list or clear the stored sessions
//! - `summary`: long-run estimate over every stored session
//!
//! Logs go to stderr and are filtered with `RUST_LOG` (default `info`).

mod commands;
mod store;
mod wav;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "grundton")]
#[command(author, version, about = "Estimate your habitual speaking pitch", long_about = None)]
struct Cli {
    /// Analysis settings (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Session store (JSON); defaults to the user data directory
    #[arg(long, global = true, value_name = "FILE")]
    store: Option<PathBuf>,

    /// Use German note names (H instead of B)
    #[arg(long, global = true)]
    german: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a session from the default microphone
    #[cfg(feature = "mic")]
    Record(commands::record::RecordArgs),

    /// Run a WAV file through the session pipeline
    Analyze(commands::analyze::AnalyzeArgs),

    /// List or clear stored sessions
    Sessions(commands::sessions::SessionsArgs),

    /// Show the long-run estimate over all stored sessions
    Summary,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = commands::Context::new(cli.config.as_deref(), cli.store, cli.german)?;

    match cli.command {
        #[cfg(feature = "mic")]
        Commands::Record(args) => commands::record::run(args, &ctx),
        Commands::Analyze(args) => commands::analyze::run(args, &ctx),
        Commands::Sessions(args) => commands::sessions::run(args, &ctx),
        Commands::Summary => commands::summary::run(&ctx),
    }
}
