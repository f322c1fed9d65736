//! Stream merge coordinator.
//!
//! Drives one [`EditSession`] through its phases:
//!
//! ```text
//! Idle -> Receiving -> AwaitingDecision -> Accepted
//!            |               |  ^
//!            |               +--+ revert_block
//!            +---------------+-> Canceled
//! ```
//!
//! Every chunk triggers a full re-diff of the candidate against the
//! original selection. Notes are small, so no incremental diffing is done;
//! only the latest view is guaranteed to be correct.

use std::sync::Arc;

use diff_engine::{DiffAlgorithm, DiffView, LcsDiff, LineId, RenderBlock};
use tracing::{debug, info, warn};

use crate::error::SessionError;
use crate::ids::SessionId;
use crate::session::{EditSession, SessionPhase};

/// Owns the lifecycle of one in-progress AI-assisted edit.
pub struct StreamMergeCoordinator {
    id: SessionId,
    phase: SessionPhase,
    session: Option<EditSession>,
    view: DiffView,
    failure: Option<SessionError>,
    algorithm: Arc<dyn DiffAlgorithm>,
}

impl std::fmt::Debug for StreamMergeCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamMergeCoordinator")
            .field("id", &self.id)
            .field("phase", &self.phase)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl Default for StreamMergeCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamMergeCoordinator {
    /// Creates an idle coordinator using the LCS line diff.
    #[must_use]
    pub fn new() -> Self {
        Self::with_algorithm(Arc::new(LcsDiff::new()))
    }

    /// Creates an idle coordinator with a shared diff algorithm.
    #[must_use]
    pub fn with_algorithm(algorithm: Arc<dyn DiffAlgorithm>) -> Self {
        Self {
            id: SessionId::new(),
            phase: SessionPhase::Idle,
            session: None,
            view: DiffView::default(),
            failure: None,
            algorithm,
        }
    }

    /// Identifier of the current (or most recent) session.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Returns true while a session is open.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.phase.is_active()
    }

    /// The open session, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    /// Latest diff of the candidate against the original selection.
    #[must_use]
    pub const fn view(&self) -> &DiffView {
        &self.view
    }

    /// Render rows for the latest view.
    #[must_use]
    pub fn render(&self) -> Vec<RenderBlock> {
        self.view.render()
    }

    /// Stream failure that canceled the last session, if any.
    #[must_use]
    pub const fn failure(&self) -> Option<&SessionError> {
        self.failure.as_ref()
    }

    /// Opens a session replacing `selection_start..selection_end` of
    /// `full_document_text`.
    ///
    /// The initial view diffs the original against an empty candidate, so
    /// every original line shows as removed until chunks arrive.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyActive` if a session is open, or
    /// `SessionError::InvalidRange` if the selection is not a valid range of
    /// the document.
    pub fn open(
        &mut self,
        full_document_text: impl Into<String>,
        selection_start: usize,
        selection_end: usize,
        original_selected_text: impl Into<String>,
    ) -> Result<&DiffView, SessionError> {
        if self.phase.is_active() {
            return Err(SessionError::AlreadyActive);
        }
        self.phase
            .validate_transition(SessionPhase::Receiving, "open")?;

        let session = EditSession::new(
            full_document_text,
            selection_start,
            selection_end,
            original_selected_text,
        )?;
        if session.selected_text() != session.original_content() {
            warn!(
                selection_start,
                selection_end,
                "Selected text differs from the document slice; diffing against the provided text"
            );
        }

        self.id = SessionId::new();
        self.failure = None;
        self.session = Some(session);
        self.phase = SessionPhase::Receiving;
        self.recompute();

        info!(
            session_id = %self.id,
            selection_start,
            selection_end,
            "Opened edit session"
        );
        Ok(&self.view)
    }

    /// Appends a streamed chunk and recomputes the view.
    ///
    /// User edits on lines that are no longer added or modified are dropped,
    /// so accept and revert always see the same set of edits.
    ///
    /// Returns `None` without doing anything unless the session is receiving;
    /// chunks that arrive after completion, cancel or accept are dropped.
    pub fn on_chunk(&mut self, text: &str) -> Option<&DiffView> {
        if self.phase != SessionPhase::Receiving {
            debug!(session_id = %self.id, phase = %self.phase, "Dropping chunk");
            return None;
        }
        let session = self.session.as_mut()?;
        session.append(text);
        self.recompute();
        self.prune_stale_edits();
        debug!(session_id = %self.id, chunk_len = text.len(), "Applied chunk");
        Some(&self.view)
    }

    /// Records a user override for an editable candidate line.
    ///
    /// Returns `false` and leaves the session untouched if no session is open,
    /// the id does not parse, or the line is not an added or modified line in
    /// the current view. Such edits are expected when the view re-renders
    /// between a keystroke and its delivery.
    pub fn on_user_edit(&mut self, line_id: &str, new_text: impl Into<String>) -> bool {
        if !self.phase.is_active() {
            debug!(session_id = %self.id, line_id, "Ignoring edit without an active session");
            return false;
        }
        let Ok(id) = line_id.parse::<LineId>() else {
            debug!(session_id = %self.id, line_id, "Ignoring edit with malformed line id");
            return false;
        };
        if self.view.editable_line(id).is_none() {
            debug!(session_id = %self.id, line_id, "Ignoring edit on a non-editable line");
            return false;
        }
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        session.record_edit(id, new_text.into());
        debug!(session_id = %self.id, line_id, "Recorded user edit");
        true
    }

    /// Marks the end of the stream and recomputes the final view.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` without a session, or
    /// `SessionError::InvalidPhase` if the stream already completed.
    pub fn on_stream_complete(&mut self) -> Result<&DiffView, SessionError> {
        self.ensure_active()?;
        self.phase
            .validate_transition(SessionPhase::AwaitingDecision, "complete stream")?;
        self.phase = SessionPhase::AwaitingDecision;
        self.recompute();
        info!(
            session_id = %self.id,
            changed_blocks = self.view.changed_block_count(),
            "Stream complete"
        );
        Ok(&self.view)
    }

    /// Cancels the session after a token stream failure.
    ///
    /// Returns the pristine document like [`cancel`](Self::cancel) and keeps
    /// the failure available through [`failure`](Self::failure).
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` if no session is open.
    pub fn on_stream_error(&mut self, reason: impl Into<String>) -> Result<String, SessionError> {
        let reason = reason.into();
        warn!(session_id = %self.id, reason = %reason, "Token stream failed; canceling");
        let document = self.cancel()?;
        self.failure = Some(SessionError::StreamFailure(reason));
        Ok(document)
    }

    /// Undoes one changed block of the current view.
    ///
    /// User edits outside the block are folded into the new candidate, and
    /// edits inside it are discarded with the block. The candidate is then
    /// re-diffed against the original. An index that does not name a changed
    /// block leaves the session as it was.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` without a session, or
    /// `SessionError::InvalidPhase` while chunks are still arriving.
    pub fn revert_block(&mut self, index: usize) -> Result<&DiffView, SessionError> {
        self.ensure_active()?;
        self.phase
            .validate_transition(SessionPhase::AwaitingDecision, "revert block")?;

        let changed = self
            .view
            .blocks()
            .get(index)
            .is_some_and(|block| block.has_changes);
        if !changed {
            warn!(session_id = %self.id, block_index = index, "Ignoring revert of a block without changes");
            return Ok(&self.view);
        }

        let Some(session) = self.session.as_mut() else {
            return Err(SessionError::NotActive);
        };
        let candidate = self
            .view
            .with_overlay(session.user_edits())
            .revert_block(index);
        session.replace_candidate(candidate);
        self.recompute();

        info!(
            session_id = %self.id,
            block_index = index,
            changed_blocks = self.view.changed_block_count(),
            "Reverted block"
        );
        Ok(&self.view)
    }

    /// Splices the candidate, with user edits applied, into the document.
    ///
    /// The session is discarded; the caller persists the returned text.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` without a session, or
    /// `SessionError::InvalidPhase` before the stream completed.
    pub fn accept(&mut self) -> Result<String, SessionError> {
        self.ensure_active()?;
        self.phase
            .validate_transition(SessionPhase::Accepted, "accept")?;
        let session = self.session.take().ok_or(SessionError::NotActive)?;

        let document = session.splice(&session.final_selection_text());
        self.phase = SessionPhase::Accepted;
        self.view = DiffView::default();
        info!(
            session_id = %self.id,
            user_edits = session.user_edits().len(),
            "Accepted edit"
        );
        Ok(document)
    }

    /// Discards the session and returns the document exactly as it was at
    /// open. Callable at any point while a session is active.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` if no session is open.
    pub fn cancel(&mut self) -> Result<String, SessionError> {
        self.ensure_active()?;
        self.phase
            .validate_transition(SessionPhase::Canceled, "cancel")?;
        let session = self.session.take().ok_or(SessionError::NotActive)?;

        self.phase = SessionPhase::Canceled;
        self.view = DiffView::default();
        info!(session_id = %self.id, "Canceled edit");
        Ok(session.full_document_text().to_owned())
    }

    fn ensure_active(&self) -> Result<(), SessionError> {
        if self.phase.is_active() && self.session.is_some() {
            Ok(())
        } else {
            Err(SessionError::NotActive)
        }
    }

    fn prune_stale_edits(&mut self) {
        let view = &self.view;
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let dropped = session.retain_edits(|line| view.editable_line(line).is_some());
        if dropped > 0 {
            debug!(session_id = %self.id, dropped, "Dropped edits on lines that stopped changing");
        }
    }

    fn recompute(&mut self) {
        if let Some(session) = &self.session {
            self.view = DiffView::compute_with(
                self.algorithm.as_ref(),
                session.original_content(),
                session.streamed_content(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diff_engine::LineKind;

    const DOC: &str = "L1\nL2\nL3\nL4";

    fn opened() -> StreamMergeCoordinator {
        let mut coordinator = StreamMergeCoordinator::new();
        coordinator.open(DOC, 3, 8, "L2\nL3").unwrap();
        coordinator
    }

    fn streamed(chunks: &[&str]) -> StreamMergeCoordinator {
        let mut coordinator = opened();
        for chunk in chunks {
            coordinator.on_chunk(chunk);
        }
        coordinator.on_stream_complete().unwrap();
        coordinator
    }

    #[test]
    fn open_shows_original_as_removed() {
        let coordinator = opened();
        assert_eq!(coordinator.phase(), SessionPhase::Receiving);
        assert_eq!(coordinator.view().stats().removed, 2);
    }

    #[test]
    fn open_twice_is_rejected() {
        let mut coordinator = opened();
        assert_eq!(
            coordinator.open(DOC, 0, 0, "").unwrap_err(),
            SessionError::AlreadyActive
        );
    }

    #[test]
    fn open_with_bad_range_stays_idle() {
        let mut coordinator = StreamMergeCoordinator::new();
        assert!(matches!(
            coordinator.open(DOC, 5, 99, ""),
            Err(SessionError::InvalidRange { .. })
        ));
        assert_eq!(coordinator.phase(), SessionPhase::Idle);
    }

    #[test]
    fn chunks_grow_the_candidate() {
        let mut coordinator = opened();
        coordinator.on_chunk("X2\n");
        let view = coordinator.on_chunk("X3").unwrap();
        let kinds: Vec<LineKind> = view.lines().map(|l| l.kind).collect();
        assert_eq!(kinds, [LineKind::Modified, LineKind::Modified]);
        assert_eq!(coordinator.session().unwrap().streamed_content(), "X2\nX3");
    }

    #[test]
    fn accept_splices_candidate() {
        let mut coordinator = streamed(&["X2\nX3"]);
        assert_eq!(coordinator.accept().unwrap(), "L1\nX2\nX3\nL4");
        assert_eq!(coordinator.phase(), SessionPhase::Accepted);
        assert!(coordinator.session().is_none());
    }

    #[test]
    fn accept_applies_user_edit() {
        let mut coordinator = streamed(&["X2\n", "X3"]);
        assert!(coordinator.on_user_edit("1", "Y2"));
        assert_eq!(coordinator.accept().unwrap(), "L1\nY2\nX3\nL4");
    }

    #[test]
    fn accept_before_completion_is_rejected() {
        let mut coordinator = opened();
        coordinator.on_chunk("X2");
        assert!(matches!(
            coordinator.accept(),
            Err(SessionError::InvalidPhase { operation: "accept", .. })
        ));
        assert!(coordinator.is_active());
    }

    #[test]
    fn edits_on_original_lines_are_ignored() {
        let mut coordinator = StreamMergeCoordinator::new();
        coordinator.open("a\nb\nc", 0, 5, "a\nb\nc").unwrap();
        coordinator.on_chunk("a\nX\nc");
        assert!(!coordinator.on_user_edit("1", "edited unchanged"));
        assert!(!coordinator.on_user_edit("9", "out of range"));
        assert!(!coordinator.on_user_edit("zero", "malformed"));
        assert!(!coordinator.on_user_edit("0", "zero"));
        assert!(coordinator.on_user_edit("2", "Y"));
        coordinator.on_stream_complete().unwrap();
        assert_eq!(coordinator.accept().unwrap(), "a\nY\nc");
    }

    #[test]
    fn edit_on_line_that_settles_is_dropped() {
        let mut coordinator = StreamMergeCoordinator::new();
        coordinator.open("apple\nb", 0, 7, "apple\nb").unwrap();
        coordinator.on_chunk("app");
        assert!(coordinator.on_user_edit("1", "APP"));

        // The rest of the line arrives and it matches the original again.
        coordinator.on_chunk("le\nb");
        assert!(coordinator.session().unwrap().user_edits().is_empty());
        coordinator.on_stream_complete().unwrap();
        assert!(coordinator.view().is_identical());
        assert_eq!(coordinator.accept().unwrap(), "apple\nb");
    }

    #[test]
    fn edit_on_line_still_changing_survives_chunks() {
        let mut coordinator = opened();
        coordinator.on_chunk("X2");
        assert!(coordinator.on_user_edit("1", "Y2"));
        coordinator.on_chunk("\nX3");
        coordinator.on_stream_complete().unwrap();
        assert_eq!(coordinator.session().unwrap().user_edits().len(), 1);
        assert_eq!(coordinator.accept().unwrap(), "L1\nY2\nX3\nL4");
    }

    #[test]
    fn cancel_restores_document_from_any_active_phase() {
        let mut receiving = opened();
        receiving.on_chunk("garbage\n");
        receiving.on_user_edit("1", "more");
        assert_eq!(receiving.cancel().unwrap(), DOC);

        let mut deciding = streamed(&["X2\nX3"]);
        deciding.revert_block(0).unwrap();
        assert_eq!(deciding.cancel().unwrap(), DOC);
        assert_eq!(deciding.phase(), SessionPhase::Canceled);
    }

    #[test]
    fn chunks_after_cancel_are_dropped() {
        let mut coordinator = opened();
        coordinator.cancel().unwrap();
        assert!(coordinator.on_chunk("late").is_none());
        assert!(!coordinator.on_user_edit("1", "late"));
        assert_eq!(coordinator.cancel(), Err(SessionError::NotActive));
        assert_eq!(coordinator.accept(), Err(SessionError::NotActive));
    }

    #[test]
    fn stream_error_cancels() {
        let mut coordinator = opened();
        coordinator.on_chunk("X2");
        assert_eq!(coordinator.on_stream_error("connection reset").unwrap(), DOC);
        assert_eq!(coordinator.phase(), SessionPhase::Canceled);
        assert_eq!(
            coordinator.failure(),
            Some(&SessionError::StreamFailure("connection reset".to_owned()))
        );
    }

    #[test]
    fn revert_restores_one_block() {
        let mut coordinator = StreamMergeCoordinator::new();
        coordinator.open("a\nb\nc\nd", 0, 7, "a\nb\nc\nd").unwrap();
        coordinator.on_chunk("a\nX\nc\nY");
        coordinator.on_stream_complete().unwrap();
        assert_eq!(coordinator.view().changed_block_count(), 2);

        let view = coordinator.revert_block(1).unwrap();
        assert_eq!(view.changed_block_count(), 1);
        assert_eq!(coordinator.accept().unwrap(), "a\nb\nc\nY");
    }

    #[test]
    fn revert_keeps_edits_outside_the_block() {
        let mut coordinator = StreamMergeCoordinator::new();
        coordinator.open("a\nb\nc\nd", 0, 7, "a\nb\nc\nd").unwrap();
        coordinator.on_chunk("a\nX\nc\nY");
        coordinator.on_stream_complete().unwrap();
        assert!(coordinator.on_user_edit("2", "edited X"));
        assert!(coordinator.on_user_edit("4", "edited Y"));

        coordinator.revert_block(1).unwrap();
        assert!(coordinator.session().unwrap().user_edits().is_empty());
        assert_eq!(coordinator.accept().unwrap(), "a\nb\nc\nedited Y");
    }

    #[test]
    fn revert_while_receiving_is_rejected() {
        let mut coordinator = opened();
        coordinator.on_chunk("X2");
        assert!(matches!(
            coordinator.revert_block(0),
            Err(SessionError::InvalidPhase { .. })
        ));
    }

    #[test]
    fn revert_of_unchanged_or_missing_block_is_a_no_op() {
        let mut coordinator = StreamMergeCoordinator::new();
        coordinator.open("a\nb", 0, 3, "a\nb").unwrap();
        coordinator.on_chunk("a\nX");
        coordinator.on_stream_complete().unwrap();
        assert!(coordinator.on_user_edit("2", "kept"));

        coordinator.revert_block(0).unwrap();
        coordinator.revert_block(7).unwrap();
        assert_eq!(coordinator.session().unwrap().user_edits().len(), 1);
        assert_eq!(coordinator.accept().unwrap(), "a\nkept");
    }

    #[test]
    fn empty_original_for_new_note() {
        let mut coordinator = StreamMergeCoordinator::new();
        coordinator.open("", 0, 0, "").unwrap();
        assert!(coordinator.view().is_identical());
        coordinator.on_chunk("# Title\nbody");
        coordinator.on_stream_complete().unwrap();
        assert_eq!(coordinator.view().stats().added, 2);
        assert_eq!(coordinator.accept().unwrap(), "# Title\nbody");
    }

    #[test]
    fn coordinator_can_reopen_after_finishing() {
        let mut coordinator = streamed(&["X2\nX3"]);
        let first = coordinator.id();
        coordinator.accept().unwrap();
        coordinator.open(DOC, 0, 2, "L1").unwrap();
        assert_ne!(coordinator.id(), first);
        assert_eq!(coordinator.phase(), SessionPhase::Receiving);
    }
}
