//! Character-level diff for highlighting inside modified lines.
//!
//! Backed by [`dissimilar`], a diff-match-patch port that runs a semantic
//! cleanup pass, so a whole-word substitution shows up as one deleted and
//! one inserted span rather than a scatter of single characters.
//!
//! The segments are cosmetic. Nothing in merge, revert or accept reads them.

use dissimilar::Chunk;
use serde::{Deserialize, Serialize};

/// Operation of one character-level segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharOp {
    /// Text present in both lines.
    Equal,
    /// Text present only in the old line.
    Delete,
    /// Text present only in the new line.
    Insert,
}

/// A run of characters sharing one [`CharOp`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharSegment {
    /// What happened to the text.
    pub op: CharOp,
    /// The text itself, never empty.
    pub text: String,
}

impl CharSegment {
    /// Returns true if the segment belongs to the old line.
    #[must_use]
    pub const fn on_old_side(&self) -> bool {
        matches!(self.op, CharOp::Equal | CharOp::Delete)
    }

    /// Returns true if the segment belongs to the new line.
    #[must_use]
    pub const fn on_new_side(&self) -> bool {
        matches!(self.op, CharOp::Equal | CharOp::Insert)
    }
}

impl From<Chunk<'_>> for CharSegment {
    fn from(chunk: Chunk<'_>) -> Self {
        let (op, text) = match chunk {
            Chunk::Equal(text) => (CharOp::Equal, text),
            Chunk::Delete(text) => (CharOp::Delete, text),
            Chunk::Insert(text) => (CharOp::Insert, text),
        };
        Self {
            op,
            text: text.to_owned(),
        }
    }
}

/// Computes the character-level edit script from `old_line` to `new_line`.
///
/// `Equal` + `Delete` segments concatenate to `old_line`, and `Equal` +
/// `Insert` segments concatenate to `new_line`.
#[must_use]
pub fn diff_chars(old_line: &str, new_line: &str) -> Vec<CharSegment> {
    dissimilar::diff(old_line, new_line)
        .into_iter()
        .map(CharSegment::from)
        .filter(|segment| !segment.text.is_empty())
        .collect()
}

/// Rebuilds the old line from a segment list.
#[must_use]
pub fn old_side(segments: &[CharSegment]) -> String {
    segments
        .iter()
        .filter(|s| s.on_old_side())
        .map(|s| s.text.as_str())
        .collect()
}

/// Rebuilds the new line from a segment list.
#[must_use]
pub fn new_side(segments: &[CharSegment]) -> String {
    segments
        .iter()
        .filter(|s| s.on_new_side())
        .map(|s| s.text.as_str())
        .collect()
}
