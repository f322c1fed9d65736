//! Document store configuration for the Scrivener kernel.

use serde::Deserialize;

pub(super) const DEFAULT_BASE_URL: &str = "http://localhost:8080/";

/// Notes backend settings.
#[derive(Debug, Deserialize, Clone)]
pub struct StoreSettings {
    /// Base URL of the notes backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
