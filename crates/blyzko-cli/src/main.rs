//! # blyzko
//!
//! Command-line entry points for the semantic ranking subsystem:
//! `blyzko build` turns a raw vocabulary into the embeddings database,
//! `blyzko worker` serves the game protocol over stdin/stdout.

#![deny(unsafe_code)]

mod build;
mod worker;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

/// blyzko — word-proximity game engine.
#[derive(Parser, Debug)]
#[command(name = "blyzko", about = "Semantic word-proximity game engine")]
struct Cli {
    /// Settings file (defaults to `~/.blyzko/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Build the embeddings database from a vocabulary file.
    Build(BuildArgs),
    /// Run the engine worker on stdin/stdout (JSON Lines).
    Worker(WorkerArgs),
}

/// Arguments for `blyzko build`.
#[derive(Args, Debug)]
struct BuildArgs {
    /// Vocabulary file: a JSON array of words.
    #[arg(long)]
    dictionary: PathBuf,

    /// Output path for the embeddings database.
    #[arg(long, default_value = "embeddings.json")]
    output: PathBuf,
}

/// Arguments for `blyzko worker`.
#[derive(Args, Debug)]
struct WorkerArgs {
    /// Embeddings database produced by `blyzko build`.
    #[arg(long)]
    database: PathBuf,
}

fn init_tracing(default_level: &str) {
    // Logs go to stderr: in worker mode stdout carries only protocol events.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => blyzko_settings::loader::load_settings_from_path(path)?,
        None => blyzko_settings::loader::load_settings().unwrap_or_default(),
    };
    init_tracing(&settings.logging.level);

    match cli.command {
        CliCommand::Build(args) => build::run(&args, &settings).await,
        CliCommand::Worker(args) => worker::run(args, &settings).await,
    }
}
