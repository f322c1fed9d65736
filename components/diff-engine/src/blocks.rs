//! Grouping of a diff script into changed and unchanged blocks.

use crate::types::{DiffBlock, DiffLine};

/// Partitions `lines` into maximal runs that share the same changed status.
///
/// Blocks are numbered from 0 in order. Adjacent blocks always differ in
/// `has_changes`, and concatenating their lines yields `lines` again.
#[must_use]
pub fn group_blocks(lines: Vec<DiffLine>) -> Vec<DiffBlock> {
    let mut blocks: Vec<DiffBlock> = Vec::new();

    for line in lines {
        let changed = line.kind.is_change();
        match blocks.last_mut() {
            Some(block) if block.has_changes == changed => block.lines.push(line),
            _ => blocks.push(DiffBlock {
                index: blocks.len(),
                has_changes: changed,
                lines: vec![line],
            }),
        }
    }

    blocks
}
