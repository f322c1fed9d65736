//! Post-processing of raw line diffs.
//!
//! A reader perceives "line 5 was rewritten" as one edit, not as a deletion
//! followed by an insertion, so removal runs directly followed by addition
//! runs are paired into `modified` lines.

use crate::types::{DiffLine, LineKind};

/// Pairs each maximal run of removed lines with the run of added lines that
/// immediately follows it.
///
/// Pairing is index-by-index up to the shorter run. Leftover removals are
/// emitted first, then leftover additions. Removal runs that are not
/// followed by additions, and all other lines, pass through unchanged.
pub(crate) fn merge_modifications(lines: Vec<DiffLine>) -> Vec<DiffLine> {
    if lines.len() < 2 {
        return lines;
    }

    let mut result = Vec::with_capacity(lines.len());
    let mut iter = lines.into_iter().peekable();

    while let Some(line) = iter.next() {
        if line.kind != LineKind::Removed {
            result.push(line);
            continue;
        }

        let mut removed = vec![line];
        while let Some(next) = iter.next_if(|l| l.kind == LineKind::Removed) {
            removed.push(next);
        }
        let mut added = Vec::new();
        while let Some(next) = iter.next_if(|l| l.kind == LineKind::Added) {
            added.push(next);
        }

        let pairs = removed.len().min(added.len());
        let mut removed = removed.into_iter();
        let mut added = added.into_iter();
        for (old, new) in removed.by_ref().zip(added.by_ref()).take(pairs) {
            result.push(DiffLine::modified(old, new));
        }
        result.extend(removed);
        result.extend(added);
    }

    result
}
