//! Polling supervisor.
//!
//! Drives the wait → fetch → compare cycle against a fixed baseline until a
//! change is found, the source fails, or cancellation is observed.
//!
//! ```text
//! Idle ─▶ Waiting ──cancelled──────────────────────▶ Cancelled
//!           │ elapsed
//!           ▼
//!         Fetching ──ClosedByUser──────────────────▶ Cancelled
//!           │       ──other fault──────────────────▶ SourceUnavailable
//!           ▼
//!         Comparing ──changes──────────────────────▶ ChangesDetected
//!           │ none
//!           └──refresh──▶ Waiting
//! ```
//!
//! Cancellation is observed at the top of each cycle and while sleeping,
//! never in the middle of a fetch. Faults are not retried.

use crate::diff::{compute_changes_with, ChangeSet, DiffOptions};
use crate::snapshot::Snapshot;
use crate::tracking::cancel::CancellationSignal;
use crate::tracking::clock::{Clock, SystemClock, Wake};
use crate::tracking::fault::{FaultKind, SourceFault};
use crate::tracking::source::DocumentSource;
use std::sync::Arc;
use std::time::Duration;

/// Default wait between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// How a supervised run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalOutcome {
    /// The document's text diverged from the baseline.
    ChangesDetected {
        changes: ChangeSet,
        current: Snapshot,
    },
    /// Stop was requested, or the source was closed by the user.
    Cancelled,
    /// The source failed; `summary` is never empty.
    SourceUnavailable {
        summary: String,
    },
}

/// Runs the polling loop with a fixed interval, clock and diff options.
#[derive(Clone)]
pub struct Supervisor {
    interval: Duration,
    diff_options: DiffOptions,
    clock: Arc<dyn Clock>,
}

impl Supervisor {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            diff_options: DiffOptions::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock used for waits between polls.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_diff_options(mut self, diff_options: DiffOptions) -> Self {
        self.diff_options = diff_options;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn diff_options(&self) -> &DiffOptions {
        &self.diff_options
    }

    /// Poll `source` until a terminal outcome.
    ///
    /// Source faults never escape; they become [`TerminalOutcome::Cancelled`]
    /// or [`TerminalOutcome::SourceUnavailable`]. The source is not closed
    /// here; that belongs to the session that owns it.
    pub fn run<S>(
        &self,
        source: &mut S,
        baseline: &Snapshot,
        cancel: &CancellationSignal,
    ) -> TerminalOutcome
    where
        S: DocumentSource + ?Sized,
    {
        let mut tick: u64 = 0;
        loop {
            if cancel.is_cancelled() {
                tracing::debug!(tick, "cancellation observed before sleep");
                return TerminalOutcome::Cancelled;
            }
            if self.clock.sleep(self.interval, cancel) == Wake::Cancelled {
                tracing::debug!(tick, "cancellation observed while sleeping");
                return TerminalOutcome::Cancelled;
            }

            tick += 1;
            let current = match source.current_snapshot() {
                Ok(snapshot) => snapshot,
                Err(fault) => return classify_fault(fault, tick, "fetch"),
            };

            if current.same_text_as(baseline) {
                tracing::debug!(
                    tick,
                    digest = current.digest(),
                    event = pagewatch_core_types::schema::EVENT_TICK,
                    "unchanged"
                );
            } else if let Some(changes) =
                compute_changes_with(baseline.text(), current.text(), &self.diff_options)
            {
                tracing::info!(
                    tick,
                    digest = current.digest(),
                    pair_count = changes.len(),
                    event = pagewatch_core_types::schema::EVENT_TICK,
                    "changes detected"
                );
                return TerminalOutcome::ChangesDetected { changes, current };
            } else {
                tracing::debug!(
                    tick,
                    digest = current.digest(),
                    event = pagewatch_core_types::schema::EVENT_TICK,
                    "text differs without pairable changes"
                );
            }

            if let Err(fault) = source.refresh() {
                return classify_fault(fault, tick, "refresh");
            }
        }
    }
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl std::fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("interval", &self.interval)
            .field("diff_options", &self.diff_options)
            .finish_non_exhaustive()
    }
}

fn classify_fault(fault: SourceFault, tick: u64, step: &'static str) -> TerminalOutcome {
    match fault.kind() {
        FaultKind::ClosedByUser => {
            tracing::info!(tick, step, "source closed by user");
            TerminalOutcome::Cancelled
        }
        FaultKind::Unavailable | FaultKind::Unknown => {
            let summary = fault.summary();
            tracing::warn!(tick, step, fault = ?fault.kind(), summary = %summary, "source fault");
            TerminalOutcome::SourceUnavailable { summary }
        }
    }
}
