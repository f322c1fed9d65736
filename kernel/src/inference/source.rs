//! The token source seam.

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;
use serde::{Deserialize, Serialize};

use crate::inference::InferenceError;

/// Stream of text chunks. Ends after the last chunk; an `Err` item is the
/// terminal error signal.
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String, InferenceError>> + Send>>;

/// A request to rewrite a piece of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRequest {
    /// Text the model should rewrite.
    pub text_to_edit: String,
    /// What to do with it.
    pub instruction: String,
}

impl EditRequest {
    /// Creates a request.
    pub fn new(text_to_edit: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            text_to_edit: text_to_edit.into(),
            instruction: instruction.into(),
        }
    }
}

/// Produces streamed rewrites of text.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Starts streaming the rewrite of `request.text_to_edit`.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream could not be started. Failures after
    /// the stream started arrive as an `Err` item on the stream.
    async fn stream_edit(&self, request: EditRequest) -> Result<TokenStream, InferenceError>;
}
