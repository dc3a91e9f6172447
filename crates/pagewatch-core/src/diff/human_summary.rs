//! Human-readable summary renderer for change sets.

use crate::diff::model::ChangeSet;

/// Render a plain-text listing of a [`ChangeSet`], one pair per line.
///
/// Fragments are shown with Rust debug escaping so embedded newlines and
/// quotes stay on one line.
pub fn render_human_summary(changes: &ChangeSet) -> String {
    let noun = if changes.len() == 1 {
        "change"
    } else {
        "changes"
    };
    let mut out = format!("{} {noun} detected:\n", changes.len());
    for pair in changes {
        out.push_str(&format!("- {:?} -> {:?}\n", pair.removed(), pair.added()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::model::{ChangePair, EditOp};

    #[test]
    fn test_summary_lists_pairs_in_order() {
        let pairs = vec![
            ChangePair::new(EditOp::delete("10"), EditOp::insert("15")).unwrap(),
            ChangePair::new(EditOp::delete("line\n"), EditOp::insert("\"quoted\"")).unwrap(),
        ];
        let set = ChangeSet::from_pairs(pairs).unwrap();
        let summary = render_human_summary(&set);
        assert_eq!(
            summary,
            "2 changes detected:\n- \"10\" -> \"15\"\n- \"line\\n\" -> \"\\\"quoted\\\"\"\n"
        );
    }

    #[test]
    fn test_summary_singular() {
        let pair = ChangePair::new(EditOp::delete("a"), EditOp::insert("b")).unwrap();
        let set = ChangeSet::from_pairs(vec![pair]).unwrap();
        assert!(render_human_summary(&set).starts_with("1 change detected:\n"));
    }
}
