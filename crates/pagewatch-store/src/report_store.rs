//! Filesystem report sink
//!
//! Each change report becomes four files in the output directory, all named
//! after the report's timestamp label:
//!
//! - `<label>.html`: rendered report
//! - `<label>.json`: change set and snapshot metadata
//! - `<label> original.html`: baseline payload
//! - `<label> new.html`: current payload

#![allow(clippy::result_large_err)]

use crate::errors::{serialization_error, Result};
use crate::fs::atomic_write;
use chrono::{DateTime, Utc};
use pagewatch_core::diff::ChangeSet;
use pagewatch_core::render::render_change_report;
use pagewatch_core::report::{ChangeReport, ReportSink, TimestampLabel};
use pagewatch_core::{log_op_end, log_op_error, log_op_start};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Paths of the files written for one report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifacts {
    pub report: PathBuf,
    pub data: PathBuf,
    pub original: PathBuf,
    pub current: PathBuf,
}

impl ReportArtifacts {
    /// Artifact paths for `label` under `dir`
    pub fn for_label(dir: &Path, label: &TimestampLabel) -> Self {
        let stem = label.as_str();
        Self {
            report: dir.join(format!("{stem}.html")),
            data: dir.join(format!("{stem}.json")),
            original: dir.join(format!("{stem} original.html")),
            current: dir.join(format!("{stem} new.html")),
        }
    }
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    label: &'a TimestampLabel,
    target: &'a str,
    pair_count: usize,
    changes: &'a ChangeSet,
    baseline: SnapshotMeta<'a>,
    current: SnapshotMeta<'a>,
}

#[derive(Serialize)]
struct SnapshotMeta<'a> {
    digest: &'a str,
    captured_at: DateTime<Utc>,
}

/// `ReportSink` that writes reports into a directory, creating it on demand
#[derive(Debug, Clone)]
pub struct FsReportSink {
    output_dir: PathBuf,
}

impl FsReportSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn write_all(&self, report: &ChangeReport, artifacts: &ReportArtifacts) -> Result<()> {
        let document = ReportDocument {
            label: report.label(),
            target: report.target(),
            pair_count: report.changes().len(),
            changes: report.changes(),
            baseline: SnapshotMeta {
                digest: report.baseline().digest(),
                captured_at: report.baseline().captured_at(),
            },
            current: SnapshotMeta {
                digest: report.current().digest(),
                captured_at: report.current().captured_at(),
            },
        };
        let json = serde_json::to_vec_pretty(&document)
            .map_err(|e| serialization_error("encode_report", e))?;

        atomic_write(&artifacts.original, report.baseline().payload().as_bytes())?;
        atomic_write(&artifacts.current, report.current().payload().as_bytes())?;
        atomic_write(&artifacts.data, &json)?;
        // Written last: its presence marks a complete report.
        let html = render_change_report(report)?;
        atomic_write(&artifacts.report, html.as_bytes())?;
        Ok(())
    }
}

impl ReportSink for FsReportSink {
    fn persist(&mut self, report: &ChangeReport) -> Result<PathBuf> {
        let artifacts = ReportArtifacts::for_label(&self.output_dir, report.label());
        log_op_start!(
            "persist_report",
            label = %report.label(),
            output_dir = %self.output_dir.display()
        );
        let start = std::time::Instant::now();

        match self.write_all(report, &artifacts) {
            Ok(()) => {
                log_op_end!(
                    "persist_report",
                    duration_ms = start.elapsed().as_millis() as u64,
                    path = %artifacts.report.display()
                );
                Ok(artifacts.report)
            }
            Err(e) => {
                log_op_error!(
                    "persist_report",
                    e.clone(),
                    duration_ms = start.elapsed().as_millis() as u64
                );
                Err(e)
            }
        }
    }
}
