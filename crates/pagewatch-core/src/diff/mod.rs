//! Semantic text diff engine.
//!
//! Compares two text snapshots and reduces the difference to ordered
//! (removal, addition) pairs suitable for change reports.
//!
//! ## Entry point
//!
//! ```ignore
//! use pagewatch_core::diff::compute_changes;
//!
//! if let Some(changes) = compute_changes(&baseline.text(), &current.text()) {
//!     println!("{}", pagewatch_core::diff::render_human_summary(&changes));
//! }
//! ```
//!
//! ## Guarantees
//!
//! - **Determinism**: identical inputs produce identical change sets.
//! - **No empty change sets**: "no changes" is `None`.
//! - **Positional pairing**: the k-th removal is paired with the k-th
//!   addition; unmatched removals or additions are dropped.

mod cleanup;
pub mod engine;
pub mod human_summary;
pub mod model;
mod script;

pub use engine::{
    compute_changes, compute_changes_with, edit_script, pair_changes, DiffOptions,
    DEFAULT_MAX_CHAR_CELLS,
};
pub use human_summary::render_human_summary;
pub use model::{ChangePair, ChangeSet, EditKind, EditOp};
