//! pagewatch CLI
//!
//! Command-line interface for tracking web pages and diffing documents

use anyhow::Context;
use clap::{Parser, Subcommand};
use pagewatch_core::logging_facility::{init, Profile};
use pagewatch_core::TrackerConfig;
use std::path::PathBuf;

mod commands;
mod source;

#[derive(Debug, Parser)]
#[command(name = "pagewatch")]
#[command(about = "pagewatch - Web page change tracker", long_about = None)]
struct Cli {
    /// Configuration file (default: ./pagewatch.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit JSON logs on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Poll a page until its text changes, then write a report
    Track(commands::track::TrackArgs),
    /// Compare two local documents
    Diff(commands::diff::DiffArgs),
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init(if cli.log_json {
        Profile::Production
    } else {
        Profile::Development
    });

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config =
        TrackerConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Commands::Track(args) => commands::track::execute(args, config),
        Commands::Diff(args) => commands::diff::execute(args, &config.diff),
    }
}
