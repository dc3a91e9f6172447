//! Diff output types.
//!
//! `EditOp` is the unit of an edit script. `ChangePair` and `ChangeSet` are
//! the reduced, consumer-facing form: only replaced spans survive, and a
//! change set is never empty.

use serde::{Deserialize, Serialize};

/// Kind of an edit operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditKind {
    /// Text present in both snapshots
    Equal,
    /// Text present only in the old snapshot
    Delete,
    /// Text present only in the new snapshot
    Insert,
}

/// One unit of an edit script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditOp {
    kind: EditKind,
    text: String,
}

impl EditOp {
    pub fn new(kind: EditKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn equal(text: impl Into<String>) -> Self {
        Self::new(EditKind::Equal, text)
    }

    pub fn delete(text: impl Into<String>) -> Self {
        Self::new(EditKind::Delete, text)
    }

    pub fn insert(text: impl Into<String>) -> Self {
        Self::new(EditKind::Insert, text)
    }

    pub fn kind(&self) -> EditKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_equal(&self) -> bool {
        self.kind == EditKind::Equal
    }

    // Cleanup passes rewrite ops in place while they are still private to
    // the engine; once an op leaves the engine it is immutable.
    pub(crate) fn text_mut(&mut self) -> &mut String {
        &mut self.text
    }

    pub(crate) fn set_kind(&mut self, kind: EditKind) {
        self.kind = kind;
    }

    pub(crate) fn into_text(self) -> String {
        self.text
    }
}

/// A matched (removal, addition) pair representing one semantic edit.
///
/// Invariant: `removal` is a non-empty Delete op and `addition` is a
/// non-empty Insert op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangePair {
    removal: EditOp,
    addition: EditOp,
}

impl ChangePair {
    /// Pair a removal with an addition.
    ///
    /// Returns `None` if either op has the wrong kind or empty text.
    pub fn new(removal: EditOp, addition: EditOp) -> Option<Self> {
        let valid = removal.kind == EditKind::Delete
            && addition.kind == EditKind::Insert
            && !removal.text.is_empty()
            && !addition.text.is_empty();
        valid.then_some(Self { removal, addition })
    }

    pub fn removal(&self) -> &EditOp {
        &self.removal
    }

    pub fn addition(&self) -> &EditOp {
        &self.addition
    }

    /// Removed text
    pub fn removed(&self) -> &str {
        &self.removal.text
    }

    /// Added text
    pub fn added(&self) -> &str {
        &self.addition.text
    }
}

/// Ordered, non-empty sequence of change pairs in diff order.
///
/// "No changes" is `Option::<ChangeSet>::None`; there is no empty change set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChangeSet {
    pairs: Vec<ChangePair>,
}

impl ChangeSet {
    /// Build a change set, or `None` if `pairs` is empty.
    pub fn from_pairs(pairs: Vec<ChangePair>) -> Option<Self> {
        (!pairs.is_empty()).then_some(Self { pairs })
    }

    pub fn pairs(&self) -> &[ChangePair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Always `false`.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChangePair> {
        self.pairs.iter()
    }

    pub fn into_pairs(self) -> Vec<ChangePair> {
        self.pairs
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a ChangePair;
    type IntoIter = std::slice::Iter<'a, ChangePair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_pair_rejects_equal_op() {
        assert!(ChangePair::new(EditOp::equal("a"), EditOp::insert("b")).is_none());
        assert!(ChangePair::new(EditOp::delete("a"), EditOp::equal("b")).is_none());
    }

    #[test]
    fn test_change_pair_rejects_swapped_kinds() {
        assert!(ChangePair::new(EditOp::insert("a"), EditOp::delete("b")).is_none());
    }

    #[test]
    fn test_change_pair_rejects_empty_fragments() {
        assert!(ChangePair::new(EditOp::delete(""), EditOp::insert("b")).is_none());
        assert!(ChangePair::new(EditOp::delete("a"), EditOp::insert("")).is_none());
    }

    #[test]
    fn test_change_set_is_never_empty() {
        assert!(ChangeSet::from_pairs(Vec::new()).is_none());

        let pair = ChangePair::new(EditOp::delete("10"), EditOp::insert("15")).unwrap();
        let set = ChangeSet::from_pairs(vec![pair]).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.pairs()[0].removed(), "10");
        assert_eq!(set.pairs()[0].added(), "15");
    }

    #[test]
    fn test_change_set_serializes_as_array() {
        let pair = ChangePair::new(EditOp::delete("old"), EditOp::insert("new")).unwrap();
        let set = ChangeSet::from_pairs(vec![pair]).unwrap();
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "removal": { "kind": "delete", "text": "old" },
                "addition": { "kind": "insert", "text": "new" }
            }])
        );
    }
}
