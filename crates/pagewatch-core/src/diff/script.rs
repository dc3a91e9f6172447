//! Raw edit-script construction.
//!
//! The LCS itself comes from `difference::Changeset`, which builds a full
//! `old × new` table. Everything here exists to keep that table small:
//! shared prefix/suffix are trimmed first, containment and single-char
//! cases short-circuit, and blocks too large for a char table are diffed
//! line-by-line before their replaced regions are re-diffed char-wise.
//! When even the line table is too large, both texts are split on lines
//! that occur exactly once on each side and only the gaps are diffed.

use crate::diff::cleanup::{cleanup_merge, cleanup_semantic, common_prefix_len, common_suffix_len};
use crate::diff::engine::DiffOptions;
use crate::diff::model::{EditKind, EditOp};
use difference::{Changeset, Difference};
use std::collections::HashMap;

/// Build an uncleaned edit script transforming `old` into `new`.
pub(crate) fn raw_edit_script(old: &str, new: &str, options: &DiffOptions) -> Vec<EditOp> {
    diff_bounded(old, new, true, options)
}

fn diff_bounded(old: &str, new: &str, line_mode: bool, options: &DiffOptions) -> Vec<EditOp> {
    if old == new {
        return if old.is_empty() {
            Vec::new()
        } else {
            vec![EditOp::equal(old)]
        };
    }

    let prefix = common_prefix_len(old, new);
    let (old_rest, new_rest) = (&old[prefix..], &new[prefix..]);
    let suffix = common_suffix_len(old_rest, new_rest);
    let old_middle = &old_rest[..old_rest.len() - suffix];
    let new_middle = &new_rest[..new_rest.len() - suffix];

    let mut ops = Vec::new();
    if prefix > 0 {
        ops.push(EditOp::equal(&old[..prefix]));
    }
    ops.extend(diff_middle(old_middle, new_middle, line_mode, options));
    if suffix > 0 {
        ops.push(EditOp::equal(&old_rest[old_rest.len() - suffix..]));
    }
    cleanup_merge(&mut ops);
    ops
}

/// Diff two texts that share no prefix or suffix.
fn diff_middle(old: &str, new: &str, line_mode: bool, options: &DiffOptions) -> Vec<EditOp> {
    if old.is_empty() {
        return vec![EditOp::insert(new)];
    }
    if new.is_empty() {
        return vec![EditOp::delete(old)];
    }

    let old_is_longer = old.len() > new.len();
    let (long, short) = if old_is_longer {
        (old, new)
    } else {
        (new, old)
    };
    if let Some(at) = long.find(short) {
        let kind = if old_is_longer {
            EditKind::Delete
        } else {
            EditKind::Insert
        };
        return vec![
            EditOp::new(kind, &long[..at]),
            EditOp::equal(short),
            EditOp::new(kind, &long[at + short.len()..]),
        ];
    }

    let old_chars = old.chars().count();
    let new_chars = new.chars().count();
    if old_chars == 1 || new_chars == 1 {
        // No containment, so nothing is shared.
        return replace(old, new);
    }

    if old_chars.saturating_mul(new_chars) <= options.max_char_cells {
        return char_diff(old, new);
    }
    if line_mode && (old.contains('\n') || new.contains('\n')) {
        if let Some(ops) = line_diff(old, new, options) {
            return ops;
        }
    }
    replace(old, new)
}

fn replace(old: &str, new: &str) -> Vec<EditOp> {
    vec![EditOp::delete(old), EditOp::insert(new)]
}

/// Character-level LCS diff.
fn char_diff(old: &str, new: &str) -> Vec<EditOp> {
    let Changeset { diffs, .. } = Changeset::new(old, new, "");
    diffs
        .into_iter()
        .map(|diff| match diff {
            Difference::Same(text) => EditOp::equal(text),
            Difference::Rem(text) => EditOp::delete(text),
            Difference::Add(text) => EditOp::insert(text),
        })
        .filter(|op| !op.text().is_empty())
        .collect()
}

/// Diff by lines first, then re-diff every replaced block by chars.
///
/// Falls back to [`anchored_line_diff`] when the line table would exceed
/// the cell budget.
fn line_diff(old: &str, new: &str, options: &DiffOptions) -> Option<Vec<EditOp>> {
    let mut interner = LineInterner::default();
    let encoded = interner.encode(old).zip(interner.encode(new));
    let Some((old_encoded, new_encoded)) = encoded.filter(|(old_encoded, new_encoded)| {
        let cells = old_encoded
            .chars()
            .count()
            .saturating_mul(new_encoded.chars().count());
        cells <= options.max_char_cells
    }) else {
        return anchored_line_diff(old, new, options);
    };

    let mut ops = char_diff(&old_encoded, &new_encoded)
        .into_iter()
        .map(|op| {
            let text = interner.decode(op.text());
            EditOp::new(op.kind(), text)
        })
        .collect::<Vec<_>>();
    cleanup_merge(&mut ops);
    cleanup_semantic(&mut ops);

    Some(rediff_replacements(ops, options))
}

/// Keep lines unique to both texts as equalities and diff the gaps
/// between them.
///
/// Gaps recurse through [`diff_bounded`], so a line repeated across the
/// whole document can still anchor a smaller gap. Returns `None` when the
/// texts share no unique line.
fn anchored_line_diff(old: &str, new: &str, options: &DiffOptions) -> Option<Vec<EditOp>> {
    let old_lines = line_spans(old);
    let new_lines = line_spans(new);
    let anchors = unique_line_anchors(&old_lines, &new_lines);
    if anchors.is_empty() {
        return None;
    }

    let mut ops = Vec::new();
    let (mut old_at, mut new_at) = (0, 0);
    for (old_index, new_index) in anchors {
        let (old_start, line) = old_lines[old_index];
        let (new_start, _) = new_lines[new_index];
        ops.extend(diff_bounded(
            &old[old_at..old_start],
            &new[new_at..new_start],
            true,
            options,
        ));
        ops.push(EditOp::equal(line));
        old_at = old_start + line.len();
        new_at = new_start + line.len();
    }
    ops.extend(diff_bounded(&old[old_at..], &new[new_at..], true, options));
    cleanup_merge(&mut ops);
    Some(ops)
}

/// Each line of `text` (terminator kept) with its byte offset.
fn line_spans(text: &str) -> Vec<(usize, &str)> {
    let mut at = 0;
    text.split_inclusive('\n')
        .map(|line| {
            let start = at;
            at += line.len();
            (start, line)
        })
        .collect()
}

/// Line index pairs `(old, new)` for lines occurring exactly once in each
/// text, reduced to the longest run ascending on both sides.
fn unique_line_anchors<'a>(
    old: &[(usize, &'a str)],
    new: &[(usize, &'a str)],
) -> Vec<(usize, usize)> {
    // Per line: (occurrences, last index) for old, then for new.
    let mut seen: HashMap<&'a str, [(usize, usize); 2]> = HashMap::new();
    for (side, lines) in [old, new].into_iter().enumerate() {
        for (index, &(_, line)) in lines.iter().enumerate() {
            let entry = &mut seen.entry(line).or_default()[side];
            entry.0 += 1;
            entry.1 = index;
        }
    }

    let mut shared: Vec<(usize, usize)> = seen
        .values()
        .filter(|sides| sides[0].0 == 1 && sides[1].0 == 1)
        .map(|sides| (sides[0].1, sides[1].1))
        .collect();
    shared.sort_unstable();
    longest_ascending_run(&shared)
}

/// Longest subsequence of `pairs` (sorted by old index) whose new indices
/// ascend, by patience sorting.
fn longest_ascending_run(pairs: &[(usize, usize)]) -> Vec<(usize, usize)> {
    // tails[k]: index of the smallest tail ending a run of length k + 1.
    let mut tails: Vec<usize> = Vec::new();
    let mut previous: Vec<Option<usize>> = vec![None; pairs.len()];
    for (index, &(_, new_index)) in pairs.iter().enumerate() {
        let slot = tails.partition_point(|&tail| pairs[tail].1 < new_index);
        if slot > 0 {
            previous[index] = Some(tails[slot - 1]);
        }
        if slot == tails.len() {
            tails.push(index);
        } else {
            tails[slot] = index;
        }
    }

    let mut run = Vec::with_capacity(tails.len());
    let mut cursor = tails.last().copied();
    while let Some(index) = cursor {
        run.push(pairs[index]);
        cursor = previous[index];
    }
    run.reverse();
    run
}

/// Replace each delete+insert run with a char-level diff of its contents.
fn rediff_replacements(ops: Vec<EditOp>, options: &DiffOptions) -> Vec<EditOp> {
    let mut out = Vec::with_capacity(ops.len());
    let mut deleted = String::new();
    let mut inserted = String::new();

    let flush = |out: &mut Vec<EditOp>, deleted: &mut String, inserted: &mut String| {
        if !deleted.is_empty() && !inserted.is_empty() {
            out.extend(diff_bounded(deleted, inserted, false, options));
        } else if !deleted.is_empty() {
            out.push(EditOp::delete(deleted.as_str()));
        } else if !inserted.is_empty() {
            out.push(EditOp::insert(inserted.as_str()));
        }
        deleted.clear();
        inserted.clear();
    };

    for op in ops {
        match op.kind() {
            EditKind::Delete => deleted.push_str(op.text()),
            EditKind::Insert => inserted.push_str(op.text()),
            EditKind::Equal => {
                flush(&mut out, &mut deleted, &mut inserted);
                out.push(op);
            }
        }
    }
    flush(&mut out, &mut deleted, &mut inserted);
    out
}

/// Maps each distinct line to one `char` so a line diff can reuse the
/// char-level LCS.
#[derive(Default)]
struct LineInterner {
    lines: Vec<String>,
    index: HashMap<String, u32>,
}

const SURROGATE_START: u32 = 0xD800;
const SURROGATE_SPAN: u32 = 0x800;

impl LineInterner {
    /// Encode `text` as one char per line (line terminators kept).
    ///
    /// Returns `None` once the distinct lines outnumber the usable code points.
    fn encode(&mut self, text: &str) -> Option<String> {
        let mut encoded = String::new();
        for line in text.split_inclusive('\n') {
            let id = match self.index.get(line) {
                Some(&id) => id,
                None => {
                    let id = u32::try_from(self.lines.len()).ok()?;
                    self.lines.push(line.to_string());
                    self.index.insert(line.to_string(), id);
                    id
                }
            };
            encoded.push(Self::id_to_char(id)?);
        }
        Some(encoded)
    }

    fn decode(&self, encoded: &str) -> String {
        encoded
            .chars()
            .filter_map(|c| self.lines.get(Self::char_to_id(c) as usize))
            .map(String::as_str)
            .collect()
    }

    // Skip the surrogate range, which `char` cannot represent.
    fn id_to_char(id: u32) -> Option<char> {
        let code = if id < SURROGATE_START {
            id
        } else {
            id.checked_add(SURROGATE_SPAN)?
        };
        char::from_u32(code)
    }

    fn char_to_id(c: char) -> u32 {
        let code = c as u32;
        if code >= SURROGATE_START + SURROGATE_SPAN {
            code - SURROGATE_SPAN
        } else {
            code
        }
    }
}
