//! Report rendering.

pub mod change_report;

pub use change_report::render_change_report;
