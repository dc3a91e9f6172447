//! Track command
//!
//! Usage: pagewatch track <URL> [--interval <SECS>] [--output-dir <DIR>]

use crate::source::HttpDocumentSource;
use anyhow::{bail, Context};
use clap::Args;
use pagewatch_core::{log_op_end, log_op_start, SessionOutcome, Supervisor, Tracker, TrackerConfig};
use pagewatch_store::FsReportSink;
use signal_hook::consts::TERM_SIGNALS;
use signal_hook::iterator::Signals;
use std::path::PathBuf;
use std::thread;

#[derive(Debug, Args)]
pub struct TrackArgs {
    /// Page to track
    pub url: String,

    /// Seconds between polls (overrides config)
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Directory for change reports (overrides config)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

/// Execute track command
pub fn execute(args: TrackArgs, mut config: TrackerConfig) -> anyhow::Result<()> {
    if let Some(interval) = args.interval {
        config.poll_interval_secs = interval;
    }
    if let Some(output_dir) = args.output_dir {
        config.output_dir = output_dir;
    }
    config.validate()?;

    let mut source =
        HttpDocumentSource::new(&args.url, config.request_timeout(), &config.user_agent)?;
    log_op_start!("track_command", url = %source.url());
    let start = std::time::Instant::now();

    let baseline = source
        .navigate()
        .with_context(|| format!("failed to load {}", args.url))?;
    println!("Tracking {} every {}s", args.url, config.poll_interval_secs);

    let supervisor =
        Supervisor::new(config.poll_interval()).with_diff_options(config.diff.clone());
    let mut tracker = Tracker::new(supervisor);
    tracker.start(
        args.url.as_str(),
        source,
        baseline,
        FsReportSink::new(&config.output_dir),
    )?;

    // Ctrl-C and SIGTERM stop the session at its next cycle boundary.
    let mut signals = Signals::new(TERM_SIGNALS).context("failed to install signal handlers")?;
    let signals_handle = signals.handle();
    let cancel = tracker.cancel_handle();
    let signal_thread = thread::spawn(move || {
        if signals.forever().next().is_some() {
            cancel.cancel();
        }
    });

    let outcome = tracker.wait();
    signals_handle.close();
    let _ = signal_thread.join();

    log_op_end!(
        "track_command",
        duration_ms = start.elapsed().as_millis() as u64
    );
    match outcome? {
        Some(SessionOutcome::ChangesReported {
            pair_count,
            report_path,
            ..
        }) => {
            println!(
                "{} change(s) detected, report written to {}",
                pair_count,
                report_path.display()
            );
        }
        Some(SessionOutcome::Cancelled) => println!("Tracking stopped"),
        Some(SessionOutcome::SourceUnavailable { summary }) => {
            bail!("{} became unavailable: {}", args.url, summary)
        }
        None => {}
    }

    Ok(())
}
