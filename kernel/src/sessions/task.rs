//! Requests to start an edit session.

use serde::{Deserialize, Serialize};

/// What part of a note an edit replaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EditTarget {
    /// Lines `start_line..=end_line`, 1-based. Out-of-range numbers are
    /// clamped to the note.
    Lines {
        /// First selected line.
        start_line: usize,
        /// Last selected line.
        end_line: usize,
    },
    /// Fresh content. A missing note starts empty; an existing note gets
    /// the content appended at its end.
    NewNote,
}

/// An instruction to edit part of a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditTask {
    /// Note to edit.
    pub note_id: String,
    /// Part of the note to replace.
    pub target: EditTarget,
    /// What the model should do with it.
    pub instruction: String,
}

impl EditTask {
    /// Edits lines `start_line..=end_line` of a note.
    pub fn lines(
        note_id: impl Into<String>,
        start_line: usize,
        end_line: usize,
        instruction: impl Into<String>,
    ) -> Self {
        Self {
            note_id: note_id.into(),
            target: EditTarget::Lines {
                start_line,
                end_line,
            },
            instruction: instruction.into(),
        }
    }

    /// Writes new content into a note.
    pub fn new_note(note_id: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            note_id: note_id.into(),
            target: EditTarget::NewNote,
            instruction: instruction.into(),
        }
    }
}
