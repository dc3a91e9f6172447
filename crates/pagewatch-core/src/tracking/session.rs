//! One tracking session: a baseline, an owned source and a stop signal.

use crate::errors::Result;
use crate::report::{ChangeReport, ReportSink, TimestampLabel};
use crate::snapshot::Snapshot;
use crate::tracking::cancel::CancellationSignal;
use crate::tracking::source::DocumentSource;
use crate::tracking::supervisor::{Supervisor, TerminalOutcome};
use crate::{log_op_end, log_op_error, log_op_start};
use pagewatch_core_types::SessionId;
use std::path::PathBuf;

/// What a finished session reports back to its controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Changes were detected and persisted.
    ChangesReported {
        label: TimestampLabel,
        pair_count: usize,
        report_path: PathBuf,
    },
    Cancelled,
    SourceUnavailable {
        summary: String,
    },
}

/// Closes the wrapped source exactly once, at the latest on drop.
struct SourceGuard<S: DocumentSource> {
    source: S,
    closed: bool,
}

impl<S: DocumentSource> SourceGuard<S> {
    fn new(source: S) -> Self {
        Self {
            source,
            closed: false,
        }
    }

    fn get_mut(&mut self) -> &mut S {
        &mut self.source
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.source.close();
        }
    }
}

impl<S: DocumentSource> Drop for SourceGuard<S> {
    fn drop(&mut self) {
        self.close();
    }
}

/// A single run of change tracking against one document.
///
/// The session owns the source; it is released exactly once when the
/// session finishes, whatever the outcome, including panics that unwind
/// through [`TrackingSession::run`].
pub struct TrackingSession<S: DocumentSource> {
    id: SessionId,
    target: String,
    baseline: Snapshot,
    source: SourceGuard<S>,
    cancel: CancellationSignal,
}

impl<S: DocumentSource> TrackingSession<S> {
    pub fn new(
        target: impl Into<String>,
        source: S,
        baseline: Snapshot,
        cancel: CancellationSignal,
    ) -> Self {
        Self {
            id: SessionId::new(),
            target: target.into(),
            baseline,
            source: SourceGuard::new(source),
            cancel,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn baseline(&self) -> &Snapshot {
        &self.baseline
    }

    /// Run the polling loop to completion and report any changes to `sink`.
    ///
    /// The source is closed before the report is written.
    ///
    /// # Errors
    ///
    /// Only report persistence can fail; source faults are outcomes.
    pub fn run<K>(mut self, supervisor: &Supervisor, sink: &mut K) -> Result<SessionOutcome>
    where
        K: ReportSink + ?Sized,
    {
        let session_id = self.id.as_str().to_string();
        log_op_start!(
            "track_session",
            session_id = %session_id,
            target = %self.target,
            interval_ms = supervisor.interval().as_millis() as u64
        );
        let start = std::time::Instant::now();

        let terminal = supervisor.run(self.source.get_mut(), &self.baseline, &self.cancel);
        self.source.close();

        let outcome = match terminal {
            TerminalOutcome::Cancelled => SessionOutcome::Cancelled,
            TerminalOutcome::SourceUnavailable { summary } => {
                SessionOutcome::SourceUnavailable { summary }
            }
            TerminalOutcome::ChangesDetected { changes, current } => {
                let label = TimestampLabel::now();
                let pair_count = changes.len();
                let report = ChangeReport::new(
                    label.clone(),
                    self.target.clone(),
                    changes,
                    self.baseline.clone(),
                    current,
                );
                let report_path = sink.persist(&report).map_err(|e| {
                    let e = e.with_session_id(self.id.clone()).with_target(&self.target);
                    log_op_error!(
                        "track_session",
                        e.clone(),
                        duration_ms = start.elapsed().as_millis() as u64,
                        session_id = %session_id
                    );
                    e
                })?;
                SessionOutcome::ChangesReported {
                    label,
                    pair_count,
                    report_path,
                }
            }
        };

        log_op_end!(
            "track_session",
            duration_ms = start.elapsed().as_millis() as u64,
            session_id = %session_id,
            outcome = ?outcome
        );
        Ok(outcome)
    }
}
