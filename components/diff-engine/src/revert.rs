//! Per-block revert.
//!
//! Reverting rebuilds a full candidate text in which exactly one changed
//! block is restored to its original lines. The caller re-diffs that
//! candidate against the true original, so repeated reverts never drift.

use tracing::{debug, warn};

use crate::types::{DiffBlock, DiffLine};

/// Returns the candidate text that `blocks` describe.
///
/// Every non-removed line contributes its current content, joined with `\n`.
#[must_use]
pub fn candidate_text(blocks: &[DiffBlock]) -> String {
    let lines: Vec<&str> = blocks
        .iter()
        .flat_map(|block| block.lines.iter())
        .filter_map(DiffLine::new_text)
        .collect();
    lines.join("\n")
}

/// Builds a candidate text with block `index` undone.
///
/// Inside the target block, modified lines fall back to their old content,
/// removed lines are restored and added lines are dropped. All other blocks
/// keep their current side. An out-of-range index or an unchanged block is
/// a no-op and yields [`candidate_text`].
#[must_use]
pub fn revert_block(blocks: &[DiffBlock], index: usize) -> String {
    match blocks.get(index) {
        None => {
            warn!(
                block_index = index,
                block_count = blocks.len(),
                "Revert requested for a block that does not exist"
            );
            return candidate_text(blocks);
        }
        Some(block) if !block.has_changes => {
            debug!(block_index = index, "Revert of an unchanged block ignored");
            return candidate_text(blocks);
        }
        Some(_) => {}
    }

    let mut out: Vec<&str> = Vec::new();
    for block in blocks {
        // Added lines have no old side, so undoing them drops them.
        if block.index == index {
            out.extend(block.lines.iter().filter_map(DiffLine::old_text));
        } else {
            out.extend(block.lines.iter().filter_map(DiffLine::new_text));
        }
    }

    debug!(block_index = index, lines = out.len(), "Reverted block");
    out.join("\n")
}
