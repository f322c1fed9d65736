//! Session manager errors.

use edit_session::{SessionError, SessionId};

use crate::inference::InferenceError;
use crate::store::StoreError;

/// Errors returned by the session manager.
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    /// The coordinator rejected the operation.
    #[error(transparent)]
    Session(#[from] SessionError),
    /// The token stream could not be started.
    #[error("Inference failed: {0}")]
    Inference(#[from] InferenceError),
    /// The note could not be read or written.
    #[error("Document store failed: {0}")]
    Store(#[from] StoreError),
    /// No live session has this id.
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),
    /// The session's edit is being written; it can no longer be canceled.
    #[error("Session {0} is being accepted")]
    AcceptInProgress(SessionId),
    /// The note changed since the session read it, or another session on
    /// the same note is being saved.
    #[error("Note {note_id} changed since the session started")]
    Conflict {
        /// Note that changed.
        note_id: String,
    },
    /// The concurrent session limit is reached.
    #[error("Too many open sessions (max {max})")]
    TooManySessions {
        /// Configured limit.
        max: usize,
    },
}
