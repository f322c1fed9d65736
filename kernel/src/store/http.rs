//! Notes backend over HTTP.
//!
//! `GET {base}/api/notes/{id}` returns the note as plain text and
//! `PUT {base}/api/notes/{id}` with `{"content": ...}` saves it. The backend
//! answers a save with `{"success": bool, "message": ...}`.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::infrastructure::config::StoreSettings;
use crate::store::{DocumentStore, StoreError};

#[derive(Serialize)]
struct SaveRequest<'a> {
    content: &'a str,
}

#[derive(Deserialize)]
struct SaveResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

/// Document store backed by the notes HTTP API.
pub struct HttpDocumentStore {
    client: Client,
    base_url: Url,
}

impl HttpDocumentStore {
    /// Creates a store talking to `base_url`.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Creates a store from settings.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Config` if the base URL does not parse.
    pub fn from_settings(settings: &StoreSettings) -> Result<Self, StoreError> {
        let base_url = Url::parse(&settings.base_url).map_err(|e| {
            StoreError::Config(format!("Invalid base URL '{}': {e}", settings.base_url))
        })?;
        Ok(Self::new(base_url))
    }

    /// URL of a note, with the id percent-encoded as one path segment.
    fn note_url(&self, note_id: &str) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| StoreError::Config(format!("Base URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "notes", note_id]);
        Ok(url)
    }
}

async fn error_from(res: reqwest::Response) -> StoreError {
    let status = res.status().as_u16();
    let message = res.text().await.unwrap_or_default();
    StoreError::Http { status, message }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn read_full_text(&self, note_id: &str) -> Result<String, StoreError> {
        let url = self.note_url(note_id)?;
        let res = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        match res.status() {
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(note_id.to_string())),
            status if status.is_success() => {
                let text = res
                    .text()
                    .await
                    .map_err(|e| StoreError::Network(e.to_string()))?;
                debug!(note_id, bytes = text.len(), "Read note");
                Ok(text)
            }
            _ => Err(error_from(res).await),
        }
    }

    async fn write_full_text(&self, note_id: &str, text: &str) -> Result<(), StoreError> {
        let url = self.note_url(note_id)?;
        let res = self
            .client
            .put(url)
            .json(&SaveRequest { content: text })
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        if !res.status().is_success() {
            return Err(error_from(res).await);
        }

        let status = res.status().as_u16();
        // Backends that answer with an empty or non-JSON body are taken at
        // their status code.
        let body = res.bytes().await.unwrap_or_default();
        if let Ok(reply) = serde_json::from_slice::<SaveResponse>(&body) {
            if !reply.success {
                return Err(StoreError::Http {
                    status,
                    message: reply.message.unwrap_or_else(|| "save rejected".to_string()),
                });
            }
        }
        debug!(note_id, bytes = text.len(), "Saved note");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_url_encodes_id() -> anyhow::Result<()> {
        let store = HttpDocumentStore::new(Url::parse("http://localhost:8080/")?);
        assert_eq!(
            store.note_url("folder/my note")?.as_str(),
            "http://localhost:8080/api/notes/folder%2Fmy%20note"
        );
        Ok(())
    }

    #[test]
    fn note_url_keeps_base_path() -> anyhow::Result<()> {
        let store = HttpDocumentStore::new(Url::parse("http://host/backend/")?);
        assert_eq!(store.note_url("n")?.as_str(), "http://host/backend/api/notes/n");
        Ok(())
    }

    #[test]
    fn from_settings_rejects_bad_url() {
        let settings = StoreSettings {
            base_url: "not a url".to_string(),
        };
        assert!(matches!(
            HttpDocumentStore::from_settings(&settings),
            Err(StoreError::Config(_))
        ));
    }
}
