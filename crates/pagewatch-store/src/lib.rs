//! pagewatch store - filesystem persistence for change reports
//!
//! Provides:
//! - Atomic temp-then-rename writes
//! - `FsReportSink`, the `ReportSink` that materializes reports on disk

pub mod errors;
pub mod fs;
pub mod report_store;

pub use errors::Result;
pub use report_store::{FsReportSink, ReportArtifacts};
