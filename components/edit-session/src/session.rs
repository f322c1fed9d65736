//! Edit session state and phase transitions.

use std::collections::BTreeMap;
use std::fmt;

use diff_engine::LineId;
use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Lifecycle phase of an edit session.
///
/// `Receiving` and `AwaitingDecision` are the active phases. `Accepted` and
/// `Canceled` are terminal for the session, though the coordinator holding
/// it may open a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No session opened yet.
    Idle,
    /// Chunks are arriving from the token stream.
    Receiving,
    /// The stream ended; waiting for accept or cancel.
    AwaitingDecision,
    /// The candidate was spliced into the document.
    Accepted,
    /// The document was restored untouched.
    Canceled,
}

impl SessionPhase {
    /// Returns true while a session is open.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Receiving | Self::AwaitingDecision)
    }

    /// Returns true once a session has been finalized.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Accepted | Self::Canceled)
    }

    /// Validates a phase transition for `operation`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidPhase` if `self -> to` is not allowed.
    pub fn validate_transition(
        self,
        to: Self,
        operation: &'static str,
    ) -> Result<(), SessionError> {
        let valid = match (self, to) {
            // Opening starts from nothing or from a finished session
            (Self::Idle | Self::Accepted | Self::Canceled, Self::Receiving) => true,
            // Chunks keep the session receiving
            (Self::Receiving, Self::Receiving | Self::AwaitingDecision) => true,
            // Reverts re-enter the decision phase
            (Self::AwaitingDecision, Self::AwaitingDecision | Self::Accepted) => true,
            // Cancel is allowed from any active phase
            (Self::Receiving | Self::AwaitingDecision, Self::Canceled) => true,
            _ => false,
        };

        if valid {
            Ok(())
        } else {
            Err(SessionError::InvalidPhase {
                operation,
                phase: self,
            })
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Receiving => "receiving",
            Self::AwaitingDecision => "awaiting decision",
            Self::Accepted => "accepted",
            Self::Canceled => "canceled",
        };
        f.write_str(name)
    }
}

/// State of one in-progress AI-assisted modification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    original_content: String,
    streamed_content: String,
    full_document_text: String,
    selection_start: usize,
    selection_end: usize,
    user_edits: BTreeMap<LineId, String>,
}

impl EditSession {
    /// Snapshots the document and the selection being replaced.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidRange` if the selection is reversed,
    /// extends past the document or does not fall on character boundaries.
    pub fn new(
        full_document_text: impl Into<String>,
        selection_start: usize,
        selection_end: usize,
        original_content: impl Into<String>,
    ) -> Result<Self, SessionError> {
        let full_document_text = full_document_text.into();
        let len = full_document_text.len();
        if selection_start > selection_end
            || selection_end > len
            || !full_document_text.is_char_boundary(selection_start)
            || !full_document_text.is_char_boundary(selection_end)
        {
            return Err(SessionError::InvalidRange {
                start: selection_start,
                end: selection_end,
                len,
            });
        }

        Ok(Self {
            original_content: original_content.into(),
            streamed_content: String::new(),
            full_document_text,
            selection_start,
            selection_end,
            user_edits: BTreeMap::new(),
        })
    }

    /// Text being replaced, as captured at open.
    #[must_use]
    pub fn original_content(&self) -> &str {
        &self.original_content
    }

    /// Candidate text received so far.
    #[must_use]
    pub fn streamed_content(&self) -> &str {
        &self.streamed_content
    }

    /// Document as it was at open.
    #[must_use]
    pub fn full_document_text(&self) -> &str {
        &self.full_document_text
    }

    /// Byte offset where the selection starts.
    #[must_use]
    pub const fn selection_start(&self) -> usize {
        self.selection_start
    }

    /// Byte offset where the selection ends (exclusive).
    #[must_use]
    pub const fn selection_end(&self) -> usize {
        self.selection_end
    }

    /// The selected slice of the document.
    #[must_use]
    pub fn selected_text(&self) -> &str {
        &self.full_document_text[self.selection_start..self.selection_end]
    }

    /// User overrides keyed by candidate line.
    #[must_use]
    pub const fn user_edits(&self) -> &BTreeMap<LineId, String> {
        &self.user_edits
    }

    pub(crate) fn append(&mut self, chunk: &str) {
        self.streamed_content.push_str(chunk);
    }

    pub(crate) fn record_edit(&mut self, line: LineId, text: String) {
        self.user_edits.insert(line, text);
    }

    /// Drops edits whose line no longer passes `keep`.
    pub(crate) fn retain_edits(&mut self, mut keep: impl FnMut(LineId) -> bool) -> usize {
        let before = self.user_edits.len();
        self.user_edits.retain(|line, _| keep(*line));
        before - self.user_edits.len()
    }

    /// Replaces the candidate wholesale. Edits refer to the old candidate's
    /// line positions, so they are dropped.
    pub(crate) fn replace_candidate(&mut self, candidate: String) {
        self.streamed_content = candidate;
        self.user_edits.clear();
    }

    /// Candidate with user edits applied.
    #[must_use]
    pub fn final_selection_text(&self) -> String {
        let mut lines: Vec<&str> = self.streamed_content.split('\n').collect();
        for (line, text) in &self.user_edits {
            if let Some(slot) = lines.get_mut(line.index()) {
                *slot = text.as_str();
            }
        }
        lines.join("\n")
    }

    /// Full document with the selection replaced by `replacement`.
    #[must_use]
    pub fn splice(&self, replacement: &str) -> String {
        let before = &self.full_document_text[..self.selection_start];
        let after = &self.full_document_text[self.selection_end..];
        let mut out = String::with_capacity(before.len() + replacement.len() + after.len());
        out.push_str(before);
        out.push_str(replacement);
        out.push_str(after);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize) -> LineId {
        LineId::new(n).unwrap()
    }

    #[test]
    fn transition_table() {
        use SessionPhase::{AwaitingDecision, Accepted, Canceled, Idle, Receiving};

        assert!(Idle.validate_transition(Receiving, "open").is_ok());
        assert!(Canceled.validate_transition(Receiving, "open").is_ok());
        assert!(Receiving.validate_transition(AwaitingDecision, "complete").is_ok());
        assert!(Receiving.validate_transition(Canceled, "cancel").is_ok());
        assert!(AwaitingDecision.validate_transition(Accepted, "accept").is_ok());

        assert_eq!(
            Receiving.validate_transition(Accepted, "accept"),
            Err(SessionError::InvalidPhase {
                operation: "accept",
                phase: Receiving
            })
        );
        assert!(Idle.validate_transition(Canceled, "cancel").is_err());
        assert!(Accepted.validate_transition(Canceled, "cancel").is_err());
    }

    #[test]
    fn phase_wire_names() {
        let json = serde_json::to_string(&SessionPhase::AwaitingDecision).unwrap();
        assert_eq!(json, "\"awaiting_decision\"");
        assert_eq!(SessionPhase::AwaitingDecision.to_string(), "awaiting decision");
    }

    #[test]
    fn rejects_bad_selection() {
        assert!(EditSession::new("abc", 2, 1, "").is_err());
        assert!(EditSession::new("abc", 0, 4, "").is_err());
        // 'é' is two bytes; offset 2 splits it.
        assert_eq!(
            EditSession::new("hé", 0, 2, "h"),
            Err(SessionError::InvalidRange {
                start: 0,
                end: 2,
                len: 3
            })
        );
        assert!(EditSession::new("", 0, 0, "").is_ok());
    }

    #[test]
    fn overlay_and_splice() {
        let mut session = EditSession::new("L1\nL2\nL3\nL4", 3, 8, "L2\nL3").unwrap();
        assert_eq!(session.selected_text(), "L2\nL3");
        session.append("X2\n");
        session.append("X3");
        session.record_edit(line(1), "Y2".to_owned());
        session.record_edit(line(7), "ignored".to_owned());
        assert_eq!(session.final_selection_text(), "Y2\nX3");
        assert_eq!(
            session.splice(&session.final_selection_text()),
            "L1\nY2\nX3\nL4"
        );
    }

    #[test]
    fn retain_edits_reports_dropped() {
        let mut session = EditSession::new("a\nb", 0, 3, "a\nb").unwrap();
        session.record_edit(line(1), "x".to_owned());
        session.record_edit(line(2), "y".to_owned());
        assert_eq!(session.retain_edits(|l| l.get() == 2), 1);
        assert_eq!(session.user_edits().len(), 1);
    }

    #[test]
    fn replacing_candidate_clears_edits() {
        let mut session = EditSession::new("a", 0, 1, "a").unwrap();
        session.append("b");
        session.record_edit(line(1), "c".to_owned());
        session.replace_candidate("a".to_owned());
        assert!(session.user_edits().is_empty());
        assert_eq!(session.final_selection_text(), "a");
    }
}
