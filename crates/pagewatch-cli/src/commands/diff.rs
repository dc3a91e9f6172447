//! Diff command
//!
//! Usage: pagewatch diff <OLD> <NEW> [--html] [--json]

use anyhow::Context;
use clap::Args;
use pagewatch_core::diff::render_human_summary;
use pagewatch_core::{compute_changes_with, extract_body_text, DiffOptions};
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Earlier document
    pub old: PathBuf,

    /// Later document
    pub new: PathBuf,

    /// Compare the visible body text of HTML documents
    #[arg(long)]
    pub html: bool,

    /// Print the change set as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute diff command
pub fn execute(args: DiffArgs, options: &DiffOptions) -> anyhow::Result<()> {
    let old = read_document(&args.old, args.html)?;
    let new = read_document(&args.new, args.html)?;

    match compute_changes_with(&old, &new, options) {
        Some(changes) if args.json => {
            println!("{}", serde_json::to_string_pretty(&changes)?);
        }
        Some(changes) => print!("{}", render_human_summary(&changes)),
        None => println!("No changes"),
    }

    Ok(())
}

fn read_document(path: &Path, html: bool) -> anyhow::Result<String> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(if html {
        extract_body_text(&content)
    } else {
        content
    })
}
