//! Session manager.
//!
//! Each session owns a [`StreamMergeCoordinator`] behind a mutex and a pump
//! task that feeds it chunks from the token stream. Locks are only held for
//! synchronous coordinator calls, never across an `.await`.

use std::collections::HashMap;
use std::sync::Arc;

use diff_engine::{DiffView, RenderBlock};
use edit_session::{SessionId, SessionPhase, StreamMergeCoordinator, locate_lines};
use futures_util::StreamExt;
use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::events::{CancelReason, EventReceiver, SessionBroadcaster, SessionEvent};
use crate::inference::{EditRequest, TokenSource, TokenStream};
use crate::infrastructure::config::SessionSettings;
use crate::sessions::error::ManagerError;
use crate::sessions::task::{EditTarget, EditTask};
use crate::store::{DocumentStore, StoreError};

type SharedCoordinator = Arc<Mutex<StreamMergeCoordinator>>;
type SessionMap = Arc<RwLock<HashMap<SessionId, SessionEntry>>>;

struct SessionEntry {
    note_id: String,
    coordinator: SharedCoordinator,
    pump: Option<JoinHandle<()>>,
    accepting: bool,
}

/// An accept that passed validation and is about to write.
struct PendingAccept {
    note_id: String,
    coordinator: SharedCoordinator,
    snapshot: String,
    preview: String,
}

impl SessionEntry {
    fn abort_pump(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
    }
}

/// Runs edit sessions against a token source and a document store.
pub struct SessionManager<S, D> {
    source: Arc<S>,
    store: Arc<D>,
    sessions: SessionMap,
    broadcaster: SessionBroadcaster,
    settings: SessionSettings,
}

impl<S, D> SessionManager<S, D>
where
    S: TokenSource + 'static,
    D: DocumentStore + 'static,
{
    /// Creates a manager with default settings.
    pub fn new(source: S, store: D) -> Self {
        Self::with_settings(source, store, SessionSettings::default())
    }

    /// Creates a manager with explicit settings.
    pub fn with_settings(source: S, store: D, settings: SessionSettings) -> Self {
        Self {
            source: Arc::new(source),
            store: Arc::new(store),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            broadcaster: SessionBroadcaster::new(settings.event_capacity),
            settings,
        }
    }

    /// Subscribes to events of every session.
    pub fn subscribe(&self) -> EventReceiver {
        self.broadcaster.subscribe()
    }

    /// The document store sessions read from and write to.
    #[must_use]
    pub fn store(&self) -> &D {
        &self.store
    }

    /// Number of live sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }

    /// Live sessions editing `note_id`.
    #[must_use]
    pub fn sessions_for_note(&self, note_id: &str) -> Vec<SessionId> {
        self.sessions
            .read()
            .iter()
            .filter(|(_, entry)| entry.note_id == note_id)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Starts a session: reads the note, opens a coordinator over the target
    /// and begins streaming the model's rewrite into it.
    ///
    /// # Errors
    ///
    /// Returns an error if the limit of concurrent sessions is reached, the
    /// note cannot be read or the token stream cannot be started. No session
    /// is left behind in that case.
    #[instrument(skip(self, task), fields(note_id = %task.note_id))]
    pub async fn start(&self, task: EditTask) -> Result<SessionId, ManagerError> {
        self.ensure_capacity()?;

        let document = match (self.store.read_full_text(&task.note_id).await, &task.target) {
            (Ok(text), _) => text,
            (Err(StoreError::NotFound(_)), EditTarget::NewNote) => {
                debug!("Note does not exist yet; starting from an empty document");
                String::new()
            }
            (Err(e), _) => return Err(e.into()),
        };

        let (start, end, selected) = match task.target {
            EditTarget::Lines {
                start_line,
                end_line,
            } => {
                let selection = locate_lines(&document, start_line, end_line);
                (selection.start, selection.end, selection.selected_text)
            }
            EditTarget::NewNote => (document.len(), document.len(), String::new()),
        };

        let mut coordinator = StreamMergeCoordinator::new();
        let initial_view = coordinator.open(document, start, end, selected.clone())?.clone();
        let session_id = coordinator.id();

        let stream = self
            .source
            .stream_edit(EditRequest::new(selected, task.instruction))
            .await?;

        let coordinator = Arc::new(Mutex::new(coordinator));
        {
            let mut sessions = self.sessions.write();
            if sessions.len() >= self.settings.max_concurrent_sessions {
                return Err(ManagerError::TooManySessions {
                    max: self.settings.max_concurrent_sessions,
                });
            }
            self.broadcaster.broadcast(SessionEvent::ViewUpdated {
                session_id,
                view: initial_view,
            });
            let pump = tokio::spawn(pump(
                session_id,
                Arc::clone(&coordinator),
                stream,
                Arc::clone(&self.sessions),
                self.broadcaster.clone(),
            ));
            sessions.insert(
                session_id,
                SessionEntry {
                    note_id: task.note_id,
                    coordinator,
                    pump: Some(pump),
                    accepting: false,
                },
            );
        }

        info!(%session_id, "Session started");
        Ok(session_id)
    }

    /// Latest view of a session.
    ///
    /// # Errors
    ///
    /// Returns `ManagerError::SessionNotFound` for an unknown id.
    pub fn view(&self, session_id: SessionId) -> Result<DiffView, ManagerError> {
        Ok(self.coordinator(session_id)?.lock().view().clone())
    }

    /// Render rows of the latest view of a session.
    ///
    /// # Errors
    ///
    /// Returns `ManagerError::SessionNotFound` for an unknown id.
    pub fn render(&self, session_id: SessionId) -> Result<Vec<RenderBlock>, ManagerError> {
        Ok(self.coordinator(session_id)?.lock().render())
    }

    /// Current phase of a session.
    ///
    /// # Errors
    ///
    /// Returns `ManagerError::SessionNotFound` for an unknown id.
    pub fn phase(&self, session_id: SessionId) -> Result<SessionPhase, ManagerError> {
        Ok(self.coordinator(session_id)?.lock().phase())
    }

    /// Records a user override of a candidate line. Returns whether the edit
    /// was applied.
    ///
    /// # Errors
    ///
    /// Returns `ManagerError::SessionNotFound` for an unknown id.
    pub fn user_edit(
        &self,
        session_id: SessionId,
        line_id: &str,
        text: impl Into<String>,
    ) -> Result<bool, ManagerError> {
        Ok(self
            .coordinator(session_id)?
            .lock()
            .on_user_edit(line_id, text))
    }

    /// Reverts one changed block and publishes the new view.
    ///
    /// # Errors
    ///
    /// Returns `ManagerError::SessionNotFound` for an unknown id, or the
    /// coordinator's error while the stream is still running.
    pub fn revert_block(
        &self,
        session_id: SessionId,
        block_index: usize,
    ) -> Result<DiffView, ManagerError> {
        let view = self
            .coordinator(session_id)?
            .lock()
            .revert_block(block_index)?
            .clone();
        self.broadcaster.broadcast(SessionEvent::ViewUpdated {
            session_id,
            view: view.clone(),
        });
        Ok(view)
    }

    /// Writes the accepted edit to the note and closes the session.
    ///
    /// The session is marked as accepting before anything is written, so it
    /// cannot be canceled while the write is in flight. The note is re-read
    /// first and must still match the text the session started from. A
    /// failed write leaves the session open for another attempt.
    ///
    /// # Errors
    ///
    /// Returns `ManagerError::SessionNotFound` for an unknown id,
    /// `ManagerError::AcceptInProgress` if another accept of this session is
    /// running, `ManagerError::Conflict` if the note changed underneath the
    /// session, the coordinator's error before the stream completed, or the
    /// store's error if the note cannot be read or written.
    #[instrument(skip(self))]
    pub async fn accept(&self, session_id: SessionId) -> Result<String, ManagerError> {
        let PendingAccept {
            note_id,
            coordinator,
            snapshot,
            preview,
        } = self.begin_accept(session_id)?;

        if let Err(e) = self.write_checked(&note_id, &snapshot, &preview).await {
            self.end_accept(session_id);
            return Err(e);
        }

        let accepted = coordinator.lock().accept();
        let document = match accepted {
            Ok(document) => document,
            Err(e) => {
                self.end_accept(session_id);
                return Err(e.into());
            }
        };
        self.sessions.write().remove(&session_id);
        if document != preview {
            // An edit landed while the write was in flight.
            debug!(%session_id, "Document changed during write; writing again");
            self.store.write_full_text(&note_id, &document).await?;
        }

        self.broadcaster.broadcast(SessionEvent::Accepted {
            session_id,
            note_id,
        });
        Ok(document)
    }

    /// Validates an accept and marks the session as accepting.
    fn begin_accept(&self, session_id: SessionId) -> Result<PendingAccept, ManagerError> {
        let mut sessions = self.sessions.write();
        let entry = sessions
            .get(&session_id)
            .ok_or(ManagerError::SessionNotFound(session_id))?;
        if entry.accepting {
            return Err(ManagerError::AcceptInProgress(session_id));
        }
        let note_id = entry.note_id.clone();
        let coordinator = Arc::clone(&entry.coordinator);

        let busy = sessions
            .values()
            .any(|other| other.accepting && other.note_id == note_id);
        if busy {
            warn!(%session_id, %note_id, "Another session on this note is being saved");
            return Err(ManagerError::Conflict { note_id });
        }

        let (snapshot, preview) = {
            let coordinator = coordinator.lock();
            coordinator
                .phase()
                .validate_transition(SessionPhase::Accepted, "accept")?;
            coordinator
                .session()
                .map(|s| {
                    (
                        s.full_document_text().to_owned(),
                        s.splice(&s.final_selection_text()),
                    )
                })
                .ok_or(edit_session::SessionError::NotActive)?
        };

        if let Some(entry) = sessions.get_mut(&session_id) {
            entry.accepting = true;
        }
        Ok(PendingAccept {
            note_id,
            coordinator,
            snapshot,
            preview,
        })
    }

    fn end_accept(&self, session_id: SessionId) {
        if let Some(entry) = self.sessions.write().get_mut(&session_id) {
            entry.accepting = false;
        }
    }

    /// Writes `text` if the note still reads as `snapshot`.
    async fn write_checked(
        &self,
        note_id: &str,
        snapshot: &str,
        text: &str,
    ) -> Result<(), ManagerError> {
        let current = match self.store.read_full_text(note_id).await {
            Ok(current) => current,
            Err(StoreError::NotFound(_)) => String::new(),
            Err(e) => return Err(e.into()),
        };
        if current != snapshot {
            warn!(note_id, "Note changed since the session started; refusing to overwrite");
            return Err(ManagerError::Conflict {
                note_id: note_id.to_owned(),
            });
        }
        self.store.write_full_text(note_id, text).await?;
        Ok(())
    }

    /// Cancels a session and returns the untouched document.
    ///
    /// # Errors
    ///
    /// Returns `ManagerError::SessionNotFound` for an unknown id, or
    /// `ManagerError::AcceptInProgress` once an accept has started writing.
    pub fn cancel(&self, session_id: SessionId) -> Result<String, ManagerError> {
        self.cancel_with(session_id, CancelReason::Requested)
    }

    /// Cancels every live session that is not being accepted. Returns how
    /// many were canceled.
    pub fn cancel_all(&self) -> usize {
        let ids: Vec<SessionId> = self.sessions.read().keys().copied().collect();
        let canceled = ids
            .into_iter()
            .filter(|id| self.cancel_with(*id, CancelReason::Shutdown).is_ok())
            .count();
        if canceled > 0 {
            info!(canceled, "Canceled all sessions");
        }
        canceled
    }

    fn cancel_with(
        &self,
        session_id: SessionId,
        reason: CancelReason,
    ) -> Result<String, ManagerError> {
        let mut entry = {
            let mut sessions = self.sessions.write();
            match sessions.get(&session_id) {
                None => return Err(ManagerError::SessionNotFound(session_id)),
                Some(entry) if entry.accepting => {
                    return Err(ManagerError::AcceptInProgress(session_id));
                }
                Some(_) => {}
            }
            sessions
                .remove(&session_id)
                .ok_or(ManagerError::SessionNotFound(session_id))?
        };
        entry.abort_pump();

        let document = entry.coordinator.lock().cancel()?;
        self.broadcaster
            .broadcast(SessionEvent::Canceled { session_id, reason });
        Ok(document)
    }

    fn coordinator(&self, session_id: SessionId) -> Result<SharedCoordinator, ManagerError> {
        self.sessions
            .read()
            .get(&session_id)
            .map(|entry| Arc::clone(&entry.coordinator))
            .ok_or(ManagerError::SessionNotFound(session_id))
    }

    fn ensure_capacity(&self) -> Result<(), ManagerError> {
        let max = self.settings.max_concurrent_sessions;
        if self.sessions.read().len() >= max {
            warn!(max, "Refusing to start session; limit reached");
            return Err(ManagerError::TooManySessions { max });
        }
        Ok(())
    }
}

impl<S, D> Drop for SessionManager<S, D> {
    fn drop(&mut self) {
        for entry in self.sessions.write().values_mut() {
            entry.abort_pump();
        }
    }
}

/// Feeds the token stream into a coordinator until it ends, fails or the
/// session stops receiving.
async fn pump(
    session_id: SessionId,
    coordinator: SharedCoordinator,
    mut stream: TokenStream,
    sessions: SessionMap,
    broadcaster: SessionBroadcaster,
) {
    while let Some(item) = stream.next().await {
        match item {
            Ok(chunk) => {
                let view = coordinator.lock().on_chunk(&chunk).cloned();
                let Some(view) = view else {
                    debug!(%session_id, "Session no longer receiving; stopping pump");
                    return;
                };
                broadcaster.broadcast(SessionEvent::ViewUpdated { session_id, view });
            }
            Err(error) => {
                let message = error.to_string();
                let canceled = coordinator.lock().on_stream_error(message.clone());
                sessions.write().remove(&session_id);
                if canceled.is_ok() {
                    broadcaster.broadcast(SessionEvent::Canceled {
                        session_id,
                        reason: CancelReason::StreamFailed { message },
                    });
                }
                return;
            }
        }
    }

    let completed = coordinator.lock().on_stream_complete().cloned();
    match completed {
        Ok(view) => {
            broadcaster.broadcast(SessionEvent::ViewUpdated { session_id, view });
            broadcaster.broadcast(SessionEvent::StreamCompleted { session_id });
        }
        Err(e) => debug!(%session_id, error = %e, "Stream ended after the session closed"),
    }
}
