//! Edit-script cleanup passes.
//!
//! A raw LCS script fragments one human edit into many tiny operations that
//! coincide on stray shared characters. These passes rewrite the script into
//! an equivalent one (applying it to the old text still yields the new text)
//! that is shorter and aligned to natural text boundaries:
//!
//! - [`cleanup_merge`] joins runs of edits between equalities into at most
//!   one delete and one insert, factors their shared prefix/suffix out into
//!   the surrounding equalities, and slides single edits sideways when that
//!   removes an equality.
//! - [`cleanup_semantic`] turns short equalities sandwiched between larger
//!   edits into edits, shifts single edits onto word/line boundaries, and
//!   pulls large delete/insert overlaps back out as equalities.
//!
//! Lengths compared by the heuristics are counted in chars; all slicing is
//! done on byte offsets that the helpers guarantee are char boundaries.

use crate::diff::model::{EditKind, EditOp};

/// Byte length of the common prefix of `a` and `b`.
pub(crate) fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars()
        .zip(b.chars())
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| x.len_utf8())
        .sum()
}

/// Byte length of the common suffix of `a` and `b`.
pub(crate) fn common_suffix_len(a: &str, b: &str) -> usize {
    a.chars()
        .rev()
        .zip(b.chars().rev())
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| x.len_utf8())
        .sum()
}

/// Byte length of the longest suffix of `a` that is also a prefix of `b`.
///
/// Works on bytes: a suffix of valid UTF-8 that equals a prefix of valid
/// UTF-8 necessarily starts and ends on char boundaries in both strings.
pub(crate) fn common_overlap_len(a: &str, b: &str) -> usize {
    let len = a.len().min(b.len());
    if len == 0 {
        return 0;
    }
    let a = &a.as_bytes()[a.len() - len..];
    let b = &b.as_bytes()[..len];
    if a == b {
        return len;
    }

    let mut best = 0;
    let mut length = 1;
    while length <= len {
        let pattern = &a[len - length..];
        let Some(found) = find_bytes(b, pattern) else {
            return best;
        };
        length += found;
        if found == 0 || a[len - length..] == b[..length] {
            best = length;
            length += 1;
        }
    }
    best
}

fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Append equal text, extending a trailing equality instead of adding a new op.
fn append_equal(ops: &mut Vec<EditOp>, text: &str) {
    if text.is_empty() {
        return;
    }
    match ops.last_mut() {
        Some(last) if last.is_equal() => last.text_mut().push_str(text),
        _ => ops.push(EditOp::equal(text)),
    }
}

/// Normalise a script: merge edit runs, factor shared affixes, slide
/// single edits sideways, and repeat until nothing moves.
pub(crate) fn cleanup_merge(ops: &mut Vec<EditOp>) {
    loop {
        merge_runs(ops);
        if !shift_single_edits(ops) {
            break;
        }
    }
}

fn merge_runs(ops: &mut Vec<EditOp>) {
    let mut merged: Vec<EditOp> = Vec::with_capacity(ops.len());
    let mut deleted = String::new();
    let mut inserted = String::new();

    // The trailing empty equality flushes the final run.
    for op in ops.drain(..).chain(std::iter::once(EditOp::equal(""))) {
        match op.kind() {
            EditKind::Delete => deleted.push_str(op.text()),
            EditKind::Insert => inserted.push_str(op.text()),
            EditKind::Equal => {
                let mut equality = op.into_text();
                if !deleted.is_empty() && !inserted.is_empty() {
                    let prefix = common_prefix_len(&deleted, &inserted);
                    if prefix > 0 {
                        let shared: String = deleted.drain(..prefix).collect();
                        inserted.replace_range(..prefix, "");
                        append_equal(&mut merged, &shared);
                    }
                    let suffix = common_suffix_len(&deleted, &inserted);
                    if suffix > 0 {
                        let shared = deleted.split_off(deleted.len() - suffix);
                        inserted.truncate(inserted.len() - suffix);
                        equality.insert_str(0, &shared);
                    }
                }
                if !deleted.is_empty() {
                    merged.push(EditOp::delete(std::mem::take(&mut deleted)));
                }
                if !inserted.is_empty() {
                    merged.push(EditOp::insert(std::mem::take(&mut inserted)));
                }
                append_equal(&mut merged, &equality);
            }
        }
    }

    *ops = merged;
}

/// `A<ba>C` becomes `<ab>AC`, and `A<ab>a` becomes `Aa<ba>`.
fn shift_single_edits(ops: &mut Vec<EditOp>) -> bool {
    let mut changed = false;
    let mut i = 1;
    while i + 1 < ops.len() {
        if ops[i - 1].is_equal() && ops[i + 1].is_equal() && !ops[i].is_equal() {
            let previous = ops[i - 1].text().to_string();
            let next = ops[i + 1].text().to_string();
            let edit = ops[i].text().to_string();

            if edit.ends_with(&previous) {
                let head = &edit[..edit.len() - previous.len()];
                *ops[i].text_mut() = format!("{previous}{head}");
                ops[i + 1].text_mut().insert_str(0, &previous);
                ops.remove(i - 1);
                changed = true;
            } else if edit.starts_with(&next) {
                ops[i - 1].text_mut().push_str(&next);
                *ops[i].text_mut() = format!("{}{next}", &edit[next.len()..]);
                ops.remove(i + 1);
                changed = true;
            }
        }
        i += 1;
    }
    changed
}

/// Reduce semantically trivial equalities and align edits to boundaries.
pub(crate) fn cleanup_semantic(ops: &mut Vec<EditOp>) {
    eliminate_trivial_equalities(ops);
    cleanup_semantic_lossless(ops);
    extract_overlaps(ops);
}

/// Turn an equality into a delete+insert when it is no longer than the
/// edits on both of its sides.
fn eliminate_trivial_equalities(ops: &mut Vec<EditOp>) {
    let mut changed = false;
    let mut equalities: Vec<usize> = Vec::new();
    let mut last_equality_len: Option<usize> = None;
    let (mut inserted_before, mut deleted_before) = (0usize, 0usize);
    let (mut inserted_after, mut deleted_after) = (0usize, 0usize);

    let mut i = 0;
    while i < ops.len() {
        let len = char_len(ops[i].text());
        match ops[i].kind() {
            EditKind::Equal => {
                equalities.push(i);
                inserted_before = inserted_after;
                deleted_before = deleted_after;
                inserted_after = 0;
                deleted_after = 0;
                last_equality_len = (len > 0).then_some(len);
            }
            kind => {
                if kind == EditKind::Insert {
                    inserted_after += len;
                } else {
                    deleted_after += len;
                }

                let trivial = last_equality_len.is_some_and(|eq_len| {
                    eq_len <= inserted_before.max(deleted_before)
                        && eq_len <= inserted_after.max(deleted_after)
                });
                if trivial {
                    if let Some(eq_index) = equalities.pop() {
                        let text = ops[eq_index].text().to_string();
                        ops.insert(eq_index, EditOp::delete(text));
                        ops[eq_index + 1].set_kind(EditKind::Insert);
                    }
                    // The equality before it has to be re-evaluated too.
                    equalities.pop();
                    inserted_before = 0;
                    deleted_before = 0;
                    inserted_after = 0;
                    deleted_after = 0;
                    last_equality_len = None;
                    changed = true;
                    i = equalities.last().map_or(0, |&eq| eq + 1);
                    continue;
                }
            }
        }
        i += 1;
    }

    if changed {
        cleanup_merge(ops);
    }
}

/// Score how natural a boundary between `one` and `two` is (6 = best).
fn semantic_score(one: &str, two: &str) -> u8 {
    let (Some(last), Some(first)) = (one.chars().next_back(), two.chars().next()) else {
        return 6;
    };

    let non_alnum_1 = !last.is_alphanumeric();
    let non_alnum_2 = !first.is_alphanumeric();
    let whitespace_1 = non_alnum_1 && last.is_whitespace();
    let whitespace_2 = non_alnum_2 && first.is_whitespace();
    let line_break_1 = whitespace_1 && matches!(last, '\r' | '\n');
    let line_break_2 = whitespace_2 && matches!(first, '\r' | '\n');
    let blank_line_1 = line_break_1 && (one.ends_with("\n\n") || one.ends_with("\n\r\n"));
    let blank_line_2 = line_break_2
        && ["\n\n", "\n\r\n", "\r\n\n", "\r\n\r\n"]
            .iter()
            .any(|start| two.starts_with(start));

    if blank_line_1 || blank_line_2 {
        5
    } else if line_break_1 || line_break_2 {
        4
    } else if non_alnum_1 && !whitespace_1 && whitespace_2 {
        // End of sentence
        3
    } else if whitespace_1 || whitespace_2 {
        2
    } else if non_alnum_1 || non_alnum_2 {
        1
    } else {
        0
    }
}

/// Slide single edits surrounded by equalities to the best-scoring boundary.
///
/// `The c<at c>ame.` becomes `The <cat >came.`
pub(crate) fn cleanup_semantic_lossless(ops: &mut Vec<EditOp>) {
    let mut i = 1;
    while i + 1 < ops.len() {
        if !(ops[i - 1].is_equal() && ops[i + 1].is_equal() && !ops[i].is_equal()) {
            i += 1;
            continue;
        }

        let mut equality_1 = ops[i - 1].text().to_string();
        let mut edit = ops[i].text().to_string();
        let mut equality_2 = ops[i + 1].text().to_string();

        // Shift the edit as far left as possible first.
        let offset = common_suffix_len(&equality_1, &edit);
        if offset > 0 {
            let common = edit[edit.len() - offset..].to_string();
            equality_1.truncate(equality_1.len() - offset);
            edit = format!("{common}{}", &edit[..edit.len() - offset]);
            equality_2.insert_str(0, &common);
        }

        // Then step right one char at a time, keeping the best fit.
        let mut best = (equality_1.clone(), edit.clone(), equality_2.clone());
        let mut best_score =
            semantic_score(&equality_1, &edit) + semantic_score(&edit, &equality_2);
        while let (Some(c), Some(d)) = (edit.chars().next(), equality_2.chars().next()) {
            if c != d {
                break;
            }
            equality_1.push(c);
            edit.remove(0);
            edit.push(c);
            equality_2.remove(0);
            let score = semantic_score(&equality_1, &edit) + semantic_score(&edit, &equality_2);
            // >= favours the rightmost of equally good positions
            if score >= best_score {
                best_score = score;
                best = (equality_1.clone(), edit.clone(), equality_2.clone());
            }
        }

        let mut next = i + 1;
        if ops[i - 1].text() != best.0 {
            let (best_equality_1, best_edit, best_equality_2) = best;
            *ops[i].text_mut() = best_edit;
            if best_equality_2.is_empty() {
                ops.remove(i + 1);
                next -= 1;
            } else {
                *ops[i + 1].text_mut() = best_equality_2;
            }
            if best_equality_1.is_empty() {
                ops.remove(i - 1);
                next -= 1;
            } else {
                *ops[i - 1].text_mut() = best_equality_1;
            }
        }
        i = next.max(1);
    }
}

/// Pull a delete/insert overlap that covers at least half of either side
/// back out as an equality.
///
/// `<del>abcxxx</del><ins>xxxdef</ins>` becomes `<del>abc</del>xxx<ins>def</ins>`.
fn extract_overlaps(ops: &mut Vec<EditOp>) {
    let mut i = 1;
    while i < ops.len() {
        if ops[i - 1].kind() == EditKind::Delete && ops[i].kind() == EditKind::Insert {
            let deletion = ops[i - 1].text().to_string();
            let insertion = ops[i].text().to_string();
            let deletion_len = char_len(&deletion);
            let insertion_len = char_len(&insertion);

            let overlap_1 = common_overlap_len(&deletion, &insertion);
            let overlap_2 = common_overlap_len(&insertion, &deletion);
            let overlap_1_chars = char_len(&insertion[..overlap_1]);
            let overlap_2_chars = char_len(&deletion[..overlap_2]);

            if overlap_1_chars >= overlap_2_chars {
                if overlap_1_chars > 0
                    && (overlap_1_chars * 2 >= deletion_len || overlap_1_chars * 2 >= insertion_len)
                {
                    ops.insert(i, EditOp::equal(&insertion[..overlap_1]));
                    *ops[i - 1].text_mut() = deletion[..deletion.len() - overlap_1].to_string();
                    *ops[i + 1].text_mut() = insertion[overlap_1..].to_string();
                    i += 1;
                }
            } else if overlap_2_chars * 2 >= deletion_len || overlap_2_chars * 2 >= insertion_len {
                // Reverse overlap: the insertion ends with what the deletion starts with.
                ops.insert(i, EditOp::equal(&deletion[..overlap_2]));
                ops[i - 1] = EditOp::insert(&insertion[..insertion.len() - overlap_2]);
                ops[i + 1] = EditOp::delete(&deletion[overlap_2..]);
                i += 1;
            }
            i += 1;
        }
        i += 1;
    }
}

/// Drop empty ops and join neighbours of the same kind.
pub(crate) fn coalesce(ops: &mut Vec<EditOp>) {
    let mut out: Vec<EditOp> = Vec::with_capacity(ops.len());
    for op in ops.drain(..) {
        if op.text().is_empty() {
            continue;
        }
        match out.last_mut() {
            Some(last) if last.kind() == op.kind() => last.text_mut().push_str(op.text()),
            _ => out.push(op),
        }
    }
    *ops = out;
}
