//! Change reports and the sink seam that persists them.

pub mod label;

pub use label::{TimestampLabel, LABEL_FORMAT};

use crate::diff::ChangeSet;
use crate::errors::Result;
use crate::snapshot::Snapshot;
use std::path::PathBuf;

/// Everything a sink needs to materialize one detected change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeReport {
    label: TimestampLabel,
    target: String,
    changes: ChangeSet,
    baseline: Snapshot,
    current: Snapshot,
}

impl ChangeReport {
    pub fn new(
        label: TimestampLabel,
        target: impl Into<String>,
        changes: ChangeSet,
        baseline: Snapshot,
        current: Snapshot,
    ) -> Self {
        Self {
            label,
            target: target.into(),
            changes,
            baseline,
            current,
        }
    }

    pub fn label(&self) -> &TimestampLabel {
        &self.label
    }

    /// Identifier of the tracked document (usually a URL)
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn changes(&self) -> &ChangeSet {
        &self.changes
    }

    /// Snapshot captured when tracking started
    pub fn baseline(&self) -> &Snapshot {
        &self.baseline
    }

    /// Snapshot in which the changes were detected
    pub fn current(&self) -> &Snapshot {
        &self.current
    }
}

/// Destination for change reports.
///
/// Called at most once per session, from the session's worker thread.
pub trait ReportSink {
    /// Persist `report` and return the path of its primary artifact.
    ///
    /// # Errors
    ///
    /// Returns an `Io`, `Serialization` or `Render` error if the report
    /// cannot be written.
    fn persist(&mut self, report: &ChangeReport) -> Result<PathBuf>;
}

impl<K: ReportSink + ?Sized> ReportSink for Box<K> {
    fn persist(&mut self, report: &ChangeReport) -> Result<PathBuf> {
        (**self).persist(report)
    }
}
