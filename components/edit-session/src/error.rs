//! Error types for edit sessions.

use crate::session::SessionPhase;

/// Errors that can occur while driving an edit session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// A session is already open on this coordinator.
    #[error("Session already active")]
    AlreadyActive,
    /// No session is open.
    #[error("No active session")]
    NotActive,
    /// The operation is not allowed in the current phase.
    #[error("Cannot {operation} while session is {phase}")]
    InvalidPhase {
        /// Operation that was attempted.
        operation: &'static str,
        /// Phase the session was in.
        phase: SessionPhase,
    },
    /// The selection does not describe a valid range of the document.
    #[error("Invalid selection {start}..{end} for document of {len} bytes")]
    InvalidRange {
        /// Requested start offset.
        start: usize,
        /// Requested end offset.
        end: usize,
        /// Document length in bytes.
        len: usize,
    },
    /// The token stream failed; the session was canceled.
    #[error("Stream failure: {0}")]
    StreamFailure(String),
}
