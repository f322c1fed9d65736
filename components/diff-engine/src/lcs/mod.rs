//! LCS line diff.
//!
//! Builds the classic longest-common-subsequence table over the lines of
//! both texts and backtracks from the bottom-right corner. Time and memory
//! are O(m·n) in the line counts, which is fine for single notes (tens to a
//! few thousand lines) but is the scaling limit of this engine.
//!
//! After backtracking, runs of removed lines immediately followed by runs of
//! added lines are paired into `modified` lines (see [`optimization`]).

pub mod algorithm;
pub mod optimization;

pub use algorithm::LcsDiff;

use crate::traits::{DiffAlgorithm, EditOp};
use crate::types::DiffLine;

/// Splits text into lines on `\n`.
///
/// The empty string has no lines, so an empty side of a diff contributes
/// nothing rather than one blank line.
#[must_use]
pub fn split_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        Vec::new()
    } else {
        text.split('\n').collect()
    }
}

/// Computes the line diff between `original` and `candidate` with the LCS algorithm.
#[must_use]
pub fn diff_lines(original: &str, candidate: &str) -> Vec<DiffLine> {
    diff_lines_with(&LcsDiff::new(), original, candidate)
}

/// Computes the line diff with a caller-provided algorithm.
#[must_use]
pub fn diff_lines_with<A>(algorithm: &A, original: &str, candidate: &str) -> Vec<DiffLine>
where
    A: DiffAlgorithm + ?Sized,
{
    let old_lines = split_lines(original);
    let new_lines = split_lines(candidate);
    let script = algorithm.edit_script(&old_lines, &new_lines);
    let numbered = number_script(&script, &old_lines, &new_lines);
    optimization::merge_modifications(numbered)
}

/// Turns an edit script into numbered diff lines.
fn number_script(script: &[EditOp], old_lines: &[&str], new_lines: &[&str]) -> Vec<DiffLine> {
    let mut lines = Vec::with_capacity(script.len());
    let (mut old_idx, mut new_idx) = (0usize, 0usize);

    for op in script {
        match op {
            EditOp::Keep => {
                lines.push(DiffLine::unchanged(
                    new_lines[new_idx],
                    old_idx + 1,
                    new_idx + 1,
                ));
                old_idx += 1;
                new_idx += 1;
            }
            EditOp::Delete => {
                lines.push(DiffLine::removed(old_lines[old_idx], old_idx + 1));
                old_idx += 1;
            }
            EditOp::Insert => {
                lines.push(DiffLine::added(new_lines[new_idx], new_idx + 1));
                new_idx += 1;
            }
        }
    }

    lines
}
