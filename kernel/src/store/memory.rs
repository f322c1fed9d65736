//! In-memory document store.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::store::{DocumentStore, StoreError};

/// Keeps notes in a map. Used by tests and embedding hosts.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    notes: RwLock<HashMap<String, String>>,
}

impl InMemoryDocumentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the given notes.
    pub fn with_notes<I, K, V>(notes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            notes: RwLock::new(
                notes
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Returns a note without going through the async trait.
    #[must_use]
    pub fn get(&self, note_id: &str) -> Option<String> {
        self.notes.read().get(note_id).cloned()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn read_full_text(&self, note_id: &str) -> Result<String, StoreError> {
        self.get(note_id)
            .ok_or_else(|| StoreError::NotFound(note_id.to_string()))
    }

    async fn write_full_text(&self, note_id: &str, text: &str) -> Result<(), StoreError> {
        self.notes
            .write()
            .insert(note_id.to_string(), text.to_string());
        Ok(())
    }
}
