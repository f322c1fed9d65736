//! Token source configuration for the Scrivener kernel.
//!
//! This module defines the OpenAI-compatible completion API settings.

use secrecy::SecretString;
use serde::Deserialize;

pub(super) const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/";
pub(super) const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Token source settings.
#[derive(Debug, Deserialize, Clone)]
pub struct InferenceSettings {
    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API key sent as a bearer token.
    pub api_key: Option<SecretString>,
    /// Model name (default: "gpt-4o-mini")
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature (default: 0.7)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Retries for the initial request (default: 3)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base delay for exponential backoff in milliseconds (default: 1000)
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}
