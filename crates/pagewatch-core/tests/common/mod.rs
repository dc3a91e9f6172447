//! Shared fakes for tracking tests.

#![allow(dead_code)]

use pagewatch_core::errors::{ExError, ExErrorKind, Result};
use pagewatch_core::{
    CancellationSignal, ChangeReport, Clock, DocumentSource, ReportSink, Snapshot, SourceFault,
    Wake,
};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Call counters shared between a fake source and the test body.
#[derive(Debug, Clone, Default)]
pub struct SourceCounters {
    fetches: Arc<AtomicUsize>,
    refreshes: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
}

impl SourceCounters {
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

/// Source that replays scripted fetch results, then returns `fallback`.
pub struct ScriptedSource {
    script: VecDeque<std::result::Result<Snapshot, SourceFault>>,
    fallback: Snapshot,
    counters: SourceCounters,
}

impl ScriptedSource {
    pub fn new(
        fallback: Snapshot,
        script: Vec<std::result::Result<Snapshot, SourceFault>>,
    ) -> (Self, SourceCounters) {
        let counters = SourceCounters::default();
        let source = Self {
            script: script.into(),
            fallback,
            counters: counters.clone(),
        };
        (source, counters)
    }

    /// Source that always returns `text`.
    pub fn constant(text: &str) -> (Self, SourceCounters) {
        Self::new(Snapshot::from_text(text), Vec::new())
    }
}

impl DocumentSource for ScriptedSource {
    fn current_snapshot(&mut self) -> std::result::Result<Snapshot, SourceFault> {
        self.counters.fetches.fetch_add(1, Ordering::SeqCst);
        self.script
            .pop_front()
            .unwrap_or_else(|| Ok(self.fallback.clone()))
    }

    fn refresh(&mut self) -> std::result::Result<(), SourceFault> {
        self.counters.refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn close(&mut self) {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Clock that returns immediately and counts sleeps.
#[derive(Debug, Default)]
pub struct InstantClock {
    sleeps: AtomicUsize,
}

impl InstantClock {
    pub fn sleeps(&self) -> usize {
        self.sleeps.load(Ordering::SeqCst)
    }
}

impl Clock for InstantClock {
    fn sleep(&self, _interval: Duration, cancel: &CancellationSignal) -> Wake {
        self.sleeps.fetch_add(1, Ordering::SeqCst);
        if cancel.is_cancelled() {
            Wake::Cancelled
        } else {
            Wake::Elapsed
        }
    }
}

/// Clock that raises cancellation during its first sleep.
#[derive(Debug, Default)]
pub struct CancelDuringSleepClock;

impl Clock for CancelDuringSleepClock {
    fn sleep(&self, _interval: Duration, cancel: &CancellationSignal) -> Wake {
        cancel.cancel();
        Wake::Cancelled
    }
}

/// Sink that keeps reports in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    reports: Arc<Mutex<Vec<ChangeReport>>>,
}

impl MemorySink {
    pub fn reports(&self) -> Vec<ChangeReport> {
        self.reports.lock().unwrap().clone()
    }
}

impl ReportSink for MemorySink {
    fn persist(&mut self, report: &ChangeReport) -> Result<PathBuf> {
        let mut reports = self.reports.lock().unwrap();
        reports.push(report.clone());
        Ok(PathBuf::from(format!("memory/{}.html", report.label())))
    }
}

/// Sink that always fails.
#[derive(Debug, Clone, Default)]
pub struct FailingSink;

impl ReportSink for FailingSink {
    fn persist(&mut self, _report: &ChangeReport) -> Result<PathBuf> {
        Err(ExError::new(ExErrorKind::Io)
            .with_op("persist_report")
            .with_message("disk full"))
    }
}

/// Sink that panics instead of persisting.
#[derive(Debug, Clone, Default)]
pub struct PanickingSink;

impl ReportSink for PanickingSink {
    fn persist(&mut self, _report: &ChangeReport) -> Result<PathBuf> {
        panic!("report sink exploded");
    }
}
