//! Shared fixtures for integration tests.

#![allow(dead_code)]

use anyhow::{Result, bail};
use edit_session::SessionId;
use scrivener_kernel::events::{EventReceiver, SessionEvent};
use scrivener_kernel::inference::TokenSource;
use scrivener_kernel::sessions::SessionManager;
use scrivener_kernel::store::DocumentStore;

/// A five-line note used across tests.
pub const NOTE: &str = "# Groceries\nmilk\neggs\nbread\ncoffee";

/// Waits for `id` to finish streaming. Fails if the session ends first.
pub async fn wait_for_completion(events: &mut EventReceiver, id: SessionId) -> Result<()> {
    loop {
        let event = events.recv().await?;
        if event.session_id() != id {
            continue;
        }
        match event {
            SessionEvent::StreamCompleted { .. } => return Ok(()),
            event if event.is_final() => bail!("session ended before completion: {event:?}"),
            _ => {}
        }
    }
}

/// Waits for `id` to end and returns its final event.
pub async fn wait_for_end(events: &mut EventReceiver, id: SessionId) -> Result<SessionEvent> {
    loop {
        let event = events.recv().await?;
        if event.session_id() == id && event.is_final() {
            return Ok(event);
        }
    }
}

/// Indices of the changed blocks in a session's current view.
pub fn changed_blocks<S, D>(manager: &SessionManager<S, D>, id: SessionId) -> Result<Vec<usize>>
where
    S: TokenSource + 'static,
    D: DocumentStore + 'static,
{
    Ok(manager
        .view(id)?
        .blocks()
        .iter()
        .enumerate()
        .filter(|(_, block)| block.has_changes)
        .map(|(index, _)| index)
        .collect())
}
