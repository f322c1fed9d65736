//! Session manager configuration for the Scrivener kernel.

use serde::Deserialize;

/// Session manager settings.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct SessionSettings {
    /// Maximum number of concurrently open sessions (default: 8)
    #[serde(default = "default_max_sessions")]
    pub max_concurrent_sessions: usize,
    /// Capacity of the session event channel (default: 256)
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_concurrent_sessions: default_max_sessions(),
            event_capacity: default_event_capacity(),
        }
    }
}

fn default_max_sessions() -> usize {
    8
}

fn default_event_capacity() -> usize {
    256
}
