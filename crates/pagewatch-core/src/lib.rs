//! pagewatch Core - change detection for a polled document
//!
//! This crate provides the change-detection engine and its supporting
//! facilities:
//! - Semantic diff engine producing paired removal/addition change sets
//! - Snapshot model with body-text extraction from markup
//! - Polling supervisor, tracking session and tracker controller
//! - Report labels, report sink seam and HTML report rendering
//! - Error and logging facilities, layered configuration

pub mod config;
pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod render;
pub mod report;
pub mod snapshot;
pub mod tracking;

// Re-export commonly used types
pub use config::{ConfigLoader, TrackerConfig};
pub use diff::{
    compute_changes, compute_changes_with, ChangePair, ChangeSet, DiffOptions, EditKind, EditOp,
};
pub use errors::{ExError, ExErrorKind, PageWatchError, Result};
pub use report::{ChangeReport, ReportSink, TimestampLabel};
pub use snapshot::{extract_body_text, Snapshot};
pub use tracking::{
    CancellationSignal, Clock, DocumentSource, FaultKind, SessionOutcome, SourceFault, Supervisor,
    SystemClock, TerminalOutcome, Tracker, TrackerStatus, TrackingSession, Wake,
};
