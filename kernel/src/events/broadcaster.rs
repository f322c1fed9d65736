//! Fan-out of session events to subscribers.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::events::{EventError, SessionEvent};

/// Broadcasts session events to every subscriber.
#[derive(Clone)]
pub struct SessionBroadcaster {
    sender: broadcast::Sender<SessionEvent>,
    subscriber_count: Arc<AtomicUsize>,
}

impl SessionBroadcaster {
    /// Creates a broadcaster buffering up to `capacity` events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            subscriber_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Subscribes to events published from now on.
    pub fn subscribe(&self) -> EventReceiver {
        self.subscriber_count.fetch_add(1, Ordering::SeqCst);
        debug!(subscriber_count = self.subscriber_count(), "Subscriber added");
        EventReceiver {
            inner: self.sender.subscribe(),
            subscriber_count: Arc::clone(&self.subscriber_count),
        }
    }

    /// Publishes an event. Having no subscribers is not an error.
    pub fn broadcast(&self, event: SessionEvent) {
        if let Ok(receiver_count) = self.sender.send(event) {
            debug!(receiver_count, "Event broadcast");
        } else {
            debug!("Event dropped; no subscribers");
        }
    }

    /// Returns the number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscriber_count.load(Ordering::SeqCst)
    }
}

impl Default for SessionBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Receiving half of a [`SessionBroadcaster`] subscription.
pub struct EventReceiver {
    inner: broadcast::Receiver<SessionEvent>,
    subscriber_count: Arc<AtomicUsize>,
}

impl EventReceiver {
    /// Receives the next event.
    ///
    /// A subscriber that falls behind skips the events it missed. Views are
    /// complete snapshots, so the next `ViewUpdated` catches it up.
    ///
    /// # Errors
    ///
    /// Returns `EventError::Closed` once every broadcaster is dropped.
    pub async fn recv(&mut self) -> Result<SessionEvent, EventError> {
        loop {
            match self.inner.recv().await {
                Ok(event) => return Ok(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Subscriber lagged; skipping events");
                }
                Err(broadcast::error::RecvError::Closed) => return Err(EventError::Closed),
            }
        }
    }
}

impl Drop for EventReceiver {
    fn drop(&mut self) {
        self.subscriber_count.fetch_sub(1, Ordering::SeqCst);
        debug!(
            subscriber_count = self.subscriber_count.load(Ordering::SeqCst),
            "Subscriber removed"
        );
    }
}
