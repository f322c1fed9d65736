//! Document stores.
//!
//! The session manager reads a note once when a session starts and writes
//! it once on accept. Both calls are treated as atomic.

pub mod http;
pub mod memory;

pub use http::HttpDocumentStore;
pub use memory::InMemoryDocumentStore;

use async_trait::async_trait;

/// Errors that can occur while reading or writing notes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The note does not exist.
    #[error("Note not found: {0}")]
    NotFound(String),
    /// The backend answered with an error.
    #[error("HTTP {status}: {message}")]
    Http {
        /// Response status code.
        status: u16,
        /// Response body or backend message.
        message: String,
    },
    /// The backend could not be reached.
    #[error("Network Error: {0}")]
    Network(String),
    /// The store is misconfigured.
    #[error("Configuration Error: {0}")]
    Config(String),
}

/// Reads and writes the full text of notes.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns the full text of a note.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the note does not exist.
    async fn read_full_text(&self, note_id: &str) -> Result<String, StoreError>;

    /// Replaces the full text of a note, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the write did not happen.
    async fn write_full_text(&self, note_id: &str, text: &str) -> Result<(), StoreError>;
}
