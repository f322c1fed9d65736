//! Presentation-agnostic render data.
//!
//! [`render`] flattens a [`DiffView`] into rows. A view layer only needs to
//! map [`RowKind`] to a style, make rows with a [`LineId`] editable, and wire
//! the `revert_handle` of changed blocks to a revert action.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::intraline::{CharSegment, diff_chars};
use crate::types::{DiffBlock, DiffLine, LineKind};
use crate::view::DiffView;

/// Stable identifier of an editable line: its 1-based position in the
/// candidate text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(usize);

impl LineId {
    /// Creates an id from a 1-based line number, rejecting zero.
    #[must_use]
    pub const fn new(line_number: usize) -> Option<Self> {
        if line_number == 0 {
            None
        } else {
            Some(Self(line_number))
        }
    }

    /// The 1-based line number.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }

    /// The 0-based index into the candidate's lines.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 - 1
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a string is not a valid [`LineId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseLineIdError {
    /// Not a decimal number.
    #[error("line id is not a number: {0}")]
    NotANumber(#[from] ParseIntError),
    /// Line ids start at 1.
    #[error("line id must be at least 1")]
    Zero,
}

impl FromStr for LineId {
    type Err = ParseLineIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: usize = s.trim().parse()?;
        Self::new(n).ok_or(ParseLineIdError::Zero)
    }
}

/// Visual role of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    /// Context line.
    Unchanged,
    /// Line only in the candidate.
    Added,
    /// Line only in the original.
    Removed,
    /// Original side of a modified line.
    ModifiedOld,
    /// Candidate side of a modified line.
    ModifiedNew,
}

/// One drawable row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderRow {
    /// Visual role.
    pub kind: RowKind,
    /// Line number in the original, if the row shows original text.
    pub old_line_number: Option<usize>,
    /// Line number in the candidate, if the row shows candidate text.
    pub new_line_number: Option<usize>,
    /// Row text.
    pub text: String,
    /// Character-level highlighting for modified rows, empty otherwise.
    pub segments: Vec<CharSegment>,
    /// Set on editable rows only.
    pub line_id: Option<LineId>,
}

impl RenderRow {
    /// Returns true if the user may edit this row.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        self.line_id.is_some()
    }
}

/// Rows of one block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderBlock {
    /// Block index within the view.
    pub index: usize,
    /// Whether the block contains changes.
    pub has_changes: bool,
    /// Handle to pass to a revert call; present on changed blocks only.
    pub revert_handle: Option<usize>,
    /// Rows in display order.
    pub rows: Vec<RenderRow>,
}

/// Flattens a view into render blocks.
#[must_use]
pub fn render(view: &DiffView) -> Vec<RenderBlock> {
    view.blocks().iter().map(render_block).collect()
}

fn render_block(block: &DiffBlock) -> RenderBlock {
    let mut rows = Vec::with_capacity(block.lines.len());
    for line in &block.lines {
        push_rows(line, &mut rows);
    }
    RenderBlock {
        index: block.index,
        has_changes: block.has_changes,
        revert_handle: block.has_changes.then_some(block.index),
        rows,
    }
}

fn push_rows(line: &DiffLine, rows: &mut Vec<RenderRow>) {
    match line.kind {
        LineKind::Unchanged => rows.push(RenderRow {
            kind: RowKind::Unchanged,
            old_line_number: line.old_line_number,
            new_line_number: line.new_line_number,
            text: line.content.clone(),
            segments: Vec::new(),
            line_id: None,
        }),
        LineKind::Removed => rows.push(RenderRow {
            kind: RowKind::Removed,
            old_line_number: line.old_line_number,
            new_line_number: None,
            text: line.content.clone(),
            segments: Vec::new(),
            line_id: None,
        }),
        LineKind::Added => rows.push(RenderRow {
            kind: RowKind::Added,
            old_line_number: None,
            new_line_number: line.new_line_number,
            text: line.content.clone(),
            segments: Vec::new(),
            line_id: line.new_line_number.and_then(LineId::new),
        }),
        LineKind::Modified => {
            let old_text = line.old_content.clone().unwrap_or_default();
            let segments = diff_chars(&old_text, &line.content);
            let (old_segments, new_segments) = segments
                .into_iter()
                .fold((Vec::new(), Vec::new()), |(mut old, mut new), seg| {
                    if seg.on_old_side() {
                        old.push(seg.clone());
                    }
                    if seg.on_new_side() {
                        new.push(seg);
                    }
                    (old, new)
                });
            rows.push(RenderRow {
                kind: RowKind::ModifiedOld,
                old_line_number: line.old_line_number,
                new_line_number: None,
                text: old_text,
                segments: old_segments,
                line_id: None,
            });
            rows.push(RenderRow {
                kind: RowKind::ModifiedNew,
                old_line_number: None,
                new_line_number: line.new_line_number,
                text: line.content.clone(),
                segments: new_segments,
                line_id: line.new_line_number.and_then(LineId::new),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intraline::CharOp;

    #[test]
    fn line_id_parses_and_displays() {
        let id: LineId = "3".parse().unwrap();
        assert_eq!(id.get(), 3);
        assert_eq!(id.index(), 2);
        assert_eq!(id.to_string(), "3");
        assert_eq!("0".parse::<LineId>(), Err(ParseLineIdError::Zero));
        assert!(matches!(
            "x".parse::<LineId>(),
            Err(ParseLineIdError::NotANumber(_))
        ));
    }

    #[test]
    fn only_candidate_rows_are_editable() {
        let view = DiffView::compute("a\nb\nc\nd", "a\nX\nd\nnew");
        for block in render(&view) {
            for row in block.rows {
                let editable = matches!(row.kind, RowKind::Added | RowKind::ModifiedNew);
                assert_eq!(row.is_editable(), editable, "{row:?}");
                if let Some(id) = row.line_id {
                    assert_eq!(Some(id.get()), row.new_line_number);
                }
            }
        }
    }

    #[test]
    fn changed_blocks_expose_revert_handle() {
        let view = DiffView::compute("a\nb\nc", "a\nX\nc");
        let blocks = render(&view);
        let handles: Vec<Option<usize>> = blocks.iter().map(|b| b.revert_handle).collect();
        assert_eq!(handles, [None, Some(1), None]);
    }

    #[test]
    fn modified_line_becomes_two_rows_with_segments() {
        let view = DiffView::compute("let a = 1;", "let b = 1;");
        let blocks = render(&view);
        let rows = &blocks[0].rows;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].kind, RowKind::ModifiedOld);
        assert_eq!(rows[0].text, "let a = 1;");
        assert!(rows[0].segments.iter().all(|s| s.op != CharOp::Insert));
        assert_eq!(rows[1].kind, RowKind::ModifiedNew);
        assert_eq!(rows[1].line_id, LineId::new(1));
        assert!(rows[1].segments.iter().all(|s| s.op != CharOp::Delete));
    }
}
