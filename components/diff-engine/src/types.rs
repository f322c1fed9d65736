//! Diff data model shared by every stage of the pipeline.

use serde::{Deserialize, Serialize};

/// Classification of a line in a diff script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    /// Present on both sides with identical text.
    Unchanged,
    /// Present only in the candidate.
    Added,
    /// Present only in the original.
    Removed,
    /// An original line replaced by a candidate line.
    Modified,
}

impl LineKind {
    /// Returns true for every kind except `Unchanged`.
    #[must_use]
    pub const fn is_change(self) -> bool {
        !matches!(self, Self::Unchanged)
    }

    /// Returns true if lines of this kind are sourced from the candidate text
    /// and may be edited by the user.
    #[must_use]
    pub const fn is_editable(self) -> bool {
        matches!(self, Self::Added | Self::Modified)
    }
}

/// One unit of comparison output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    /// What happened to this line.
    pub kind: LineKind,
    /// 1-based position in the candidate, absent for pure removals.
    pub new_line_number: Option<usize>,
    /// 1-based position in the original, absent for pure additions.
    pub old_line_number: Option<usize>,
    /// Current-side text; for `Modified` lines, the candidate text.
    pub content: String,
    /// Original text, present only for `Modified` lines.
    pub old_content: Option<String>,
}

impl DiffLine {
    /// Creates a line present on both sides.
    #[must_use]
    pub fn unchanged(content: impl Into<String>, old_line: usize, new_line: usize) -> Self {
        Self {
            kind: LineKind::Unchanged,
            new_line_number: Some(new_line),
            old_line_number: Some(old_line),
            content: content.into(),
            old_content: None,
        }
    }

    /// Creates a line present only in the candidate.
    #[must_use]
    pub fn added(content: impl Into<String>, new_line: usize) -> Self {
        Self {
            kind: LineKind::Added,
            new_line_number: Some(new_line),
            old_line_number: None,
            content: content.into(),
            old_content: None,
        }
    }

    /// Creates a line present only in the original.
    #[must_use]
    pub fn removed(content: impl Into<String>, old_line: usize) -> Self {
        Self {
            kind: LineKind::Removed,
            new_line_number: None,
            old_line_number: Some(old_line),
            content: content.into(),
            old_content: None,
        }
    }

    /// Pairs a removed line with an added line.
    #[must_use]
    pub fn modified(removed: Self, added: Self) -> Self {
        Self {
            kind: LineKind::Modified,
            new_line_number: added.new_line_number,
            old_line_number: removed.old_line_number,
            content: added.content,
            old_content: Some(removed.content),
        }
    }

    /// Text shown on the original side, if the line exists there.
    #[must_use]
    pub fn old_text(&self) -> Option<&str> {
        match self.kind {
            LineKind::Unchanged | LineKind::Removed => Some(&self.content),
            LineKind::Modified => self.old_content.as_deref(),
            LineKind::Added => None,
        }
    }

    /// Text shown on the candidate side, if the line exists there.
    #[must_use]
    pub fn new_text(&self) -> Option<&str> {
        match self.kind {
            LineKind::Removed => None,
            LineKind::Unchanged | LineKind::Added | LineKind::Modified => Some(&self.content),
        }
    }
}

/// A maximal contiguous run of lines sharing the same changed status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffBlock {
    /// Position within the block sequence, used as the revert handle.
    pub index: usize,
    /// True if every line in the block is a change.
    pub has_changes: bool,
    /// Lines of the block, never empty.
    pub lines: Vec<DiffLine>,
}

/// Per-kind line counts of a diff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    /// Number of `Added` lines.
    pub added: usize,
    /// Number of `Removed` lines.
    pub removed: usize,
    /// Number of `Modified` lines.
    pub modified: usize,
    /// Number of `Unchanged` lines.
    pub unchanged: usize,
}

impl DiffStats {
    /// Counts the kinds of the given lines.
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a DiffLine>) -> Self {
        lines.into_iter().fold(Self::default(), |mut stats, line| {
            match line.kind {
                LineKind::Added => stats.added += 1,
                LineKind::Removed => stats.removed += 1,
                LineKind::Modified => stats.modified += 1,
                LineKind::Unchanged => stats.unchanged += 1,
            }
            stats
        })
    }

    /// Number of lines that are not unchanged.
    #[must_use]
    pub const fn changes(&self) -> usize {
        self.added + self.removed + self.modified
    }
}
