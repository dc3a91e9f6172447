//! Change computation entry points.
//!
//! The core entry point is [`compute_changes`], which accepts two text
//! snapshots and produces an optional [`ChangeSet`].

use crate::diff::cleanup::{cleanup_semantic, coalesce};
use crate::diff::model::{ChangePair, ChangeSet, EditKind, EditOp};
use crate::diff::script::raw_edit_script;
use serde::{Deserialize, Serialize};

/// Default LCS table budget (old chars × new chars).
pub const DEFAULT_MAX_CHAR_CELLS: usize = 4_000_000;

/// Tuning knobs for the diff engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    /// Largest char-level LCS table built for a single block. Larger blocks
    /// are diffed by line, or replaced wholesale.
    pub max_char_cells: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            max_char_cells: DEFAULT_MAX_CHAR_CELLS,
        }
    }
}

/// Compute the paired changes between two snapshots.
///
/// Returns `None` when the texts are identical or when cleanup leaves no
/// delete that can be paired with an insert.
pub fn compute_changes(old_text: &str, new_text: &str) -> Option<ChangeSet> {
    compute_changes_with(old_text, new_text, &DiffOptions::default())
}

/// [`compute_changes`] with explicit options.
pub fn compute_changes_with(
    old_text: &str,
    new_text: &str,
    options: &DiffOptions,
) -> Option<ChangeSet> {
    if old_text == new_text {
        return None;
    }
    pair_changes(&edit_script(old_text, new_text, options))
}

/// Semantically cleaned edit script transforming `old_text` into `new_text`.
///
/// Concatenating the Equal and Delete texts yields `old_text`; concatenating
/// the Equal and Insert texts yields `new_text`. No op is empty and no two
/// neighbours share a kind.
pub fn edit_script(old_text: &str, new_text: &str, options: &DiffOptions) -> Vec<EditOp> {
    let mut ops = raw_edit_script(old_text, new_text, options);
    cleanup_semantic(&mut ops);
    coalesce(&mut ops);
    ops
}

/// Reduce an edit script to positional (removal, addition) pairs.
///
/// Equal ops are dropped. The k-th Delete is paired with the k-th Insert;
/// surplus ops on either side have no partner and are discarded, so a pure
/// insertion or pure deletion yields `None`.
pub fn pair_changes(ops: &[EditOp]) -> Option<ChangeSet> {
    let removals = ops
        .iter()
        .filter(|op| op.kind() == EditKind::Delete && !op.text().is_empty());
    let additions = ops
        .iter()
        .filter(|op| op.kind() == EditKind::Insert && !op.text().is_empty());

    let pairs = removals
        .zip(additions)
        .filter_map(|(removal, addition)| ChangePair::new(removal.clone(), addition.clone()))
        .collect();

    ChangeSet::from_pairs(pairs)
}
