//! Session events and their distribution.
//!
//! The session manager publishes an event every time the view of a session
//! changes or a session ends. Frontends subscribe and re-render from the
//! carried [`DiffView`].

pub mod broadcaster;

pub use broadcaster::{EventReceiver, SessionBroadcaster};

use diff_engine::DiffView;
use edit_session::SessionId;
use serde::Serialize;

/// Errors that can occur while receiving events.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
    /// Every sender was dropped.
    #[error("Event channel closed")]
    Closed,
}

/// Why a session was canceled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CancelReason {
    /// The user asked for it.
    Requested,
    /// The token stream failed.
    StreamFailed {
        /// Failure reported by the token source.
        message: String,
    },
    /// The host is shutting down.
    Shutdown,
}

/// Something that happened to a session.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The diff view changed.
    ViewUpdated {
        /// Session the view belongs to.
        session_id: SessionId,
        /// The new view.
        view: DiffView,
    },
    /// The token stream ended; the session awaits a decision.
    StreamCompleted {
        /// Session whose stream ended.
        session_id: SessionId,
    },
    /// The edit was written to the note.
    Accepted {
        /// Finished session.
        session_id: SessionId,
        /// Note that was written.
        note_id: String,
    },
    /// The edit was discarded.
    Canceled {
        /// Finished session.
        session_id: SessionId,
        /// Why it ended.
        reason: CancelReason,
    },
}

impl SessionEvent {
    /// Session the event refers to.
    #[must_use]
    pub const fn session_id(&self) -> SessionId {
        match self {
            Self::ViewUpdated { session_id, .. }
            | Self::StreamCompleted { session_id }
            | Self::Accepted { session_id, .. }
            | Self::Canceled { session_id, .. } => *session_id,
        }
    }

    /// Returns true if the session is over after this event.
    #[must_use]
    pub const fn is_final(&self) -> bool {
        matches!(self, Self::Accepted { .. } | Self::Canceled { .. })
    }
}
