//! A token source that replays fixed chunks.
//!
//! Used by tests and demos to drive sessions without a model.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{StreamExt, stream};
use parking_lot::Mutex;

use crate::inference::{EditRequest, InferenceError, TokenSource, TokenStream};

/// Replays a fixed list of chunks, optionally followed by an error.
#[derive(Debug, Default)]
pub struct ScriptedTokenSource {
    chunks: Vec<String>,
    trailing_error: Option<InferenceError>,
    start_error: Option<InferenceError>,
    chunk_delay: Option<Duration>,
    requests: Mutex<Vec<EditRequest>>,
}

impl ScriptedTokenSource {
    /// Creates a source that yields `chunks` and then ends.
    pub fn new<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Ends the stream with `error` after the chunks.
    #[must_use]
    pub fn with_trailing_error(mut self, error: InferenceError) -> Self {
        self.trailing_error = Some(error);
        self
    }

    /// Fails every request before any chunk is produced.
    #[must_use]
    pub fn failing(error: InferenceError) -> Self {
        Self {
            start_error: Some(error),
            ..Self::default()
        }
    }

    /// Waits `delay` before each chunk.
    #[must_use]
    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = Some(delay);
        self
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<EditRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl TokenSource for ScriptedTokenSource {
    async fn stream_edit(&self, request: EditRequest) -> Result<TokenStream, InferenceError> {
        self.requests.lock().push(request);
        if let Some(error) = &self.start_error {
            return Err(error.clone());
        }

        let delay = self.chunk_delay;
        let items = self
            .chunks
            .clone()
            .into_iter()
            .map(Ok)
            .chain(self.trailing_error.clone().map(Err));

        Ok(stream::iter(items)
            .then(move |item| async move {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                item
            })
            .boxed())
    }
}
