//! The diff view recomputed on every streamed chunk.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::blocks::group_blocks;
use crate::lcs::{diff_lines, diff_lines_with};
use crate::render::{LineId, RenderBlock, render};
use crate::revert;
use crate::traits::DiffAlgorithm;
use crate::types::{DiffBlock, DiffLine, DiffStats};

/// Line diff of an original against a candidate, grouped into blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffView {
    blocks: Vec<DiffBlock>,
}

impl DiffView {
    /// Diffs `candidate` against `original` with the LCS algorithm.
    #[must_use]
    pub fn compute(original: &str, candidate: &str) -> Self {
        Self::from_lines(diff_lines(original, candidate))
    }

    /// Diffs with a caller-provided algorithm.
    #[must_use]
    pub fn compute_with<A>(algorithm: &A, original: &str, candidate: &str) -> Self
    where
        A: DiffAlgorithm + ?Sized,
    {
        Self::from_lines(diff_lines_with(algorithm, original, candidate))
    }

    /// Groups an existing diff script.
    #[must_use]
    pub fn from_lines(lines: Vec<DiffLine>) -> Self {
        Self {
            blocks: group_blocks(lines),
        }
    }

    /// Blocks in order.
    #[must_use]
    pub fn blocks(&self) -> &[DiffBlock] {
        &self.blocks
    }

    /// Every line of every block, in order.
    pub fn lines(&self) -> impl Iterator<Item = &DiffLine> {
        self.blocks.iter().flat_map(|b| b.lines.iter())
    }

    /// Number of blocks with changes.
    #[must_use]
    pub fn changed_block_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.has_changes).count()
    }

    /// Returns true if the candidate equals the original.
    #[must_use]
    pub fn is_identical(&self) -> bool {
        self.changed_block_count() == 0
    }

    /// Per-kind line counts.
    #[must_use]
    pub fn stats(&self) -> DiffStats {
        DiffStats::from_lines(self.lines())
    }

    /// Candidate text described by the view.
    #[must_use]
    pub fn candidate_text(&self) -> String {
        revert::candidate_text(&self.blocks)
    }

    /// Looks up an editable line by id.
    ///
    /// Returns `None` if no added or modified line sits at that candidate
    /// position; unchanged and removed lines are never editable.
    #[must_use]
    pub fn editable_line(&self, id: LineId) -> Option<&DiffLine> {
        self.lines()
            .find(|l| l.kind.is_editable() && l.new_line_number == Some(id.get()))
    }

    /// Candidate text with block `index` undone. See [`revert::revert_block`].
    #[must_use]
    pub fn revert_block(&self, index: usize) -> String {
        revert::revert_block(&self.blocks, index)
    }

    /// Returns a copy whose editable lines carry the given replacement text.
    ///
    /// Ids that do not name an editable line are skipped. Line kinds are
    /// kept as-is; callers re-diff if they need exact classification.
    #[must_use]
    pub fn with_overlay(&self, edits: &BTreeMap<LineId, String>) -> Self {
        if edits.is_empty() {
            return self.clone();
        }
        let mut view = self.clone();
        for line in view.blocks.iter_mut().flat_map(|b| b.lines.iter_mut()) {
            if !line.kind.is_editable() {
                continue;
            }
            let edit = line
                .new_line_number
                .and_then(LineId::new)
                .and_then(|id| edits.get(&id));
            if let Some(text) = edit {
                line.content.clone_from(text);
            }
        }
        view
    }

    /// Render rows for a presentation layer.
    #[must_use]
    pub fn render(&self) -> Vec<RenderBlock> {
        render(self)
    }
}
