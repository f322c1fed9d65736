//! Configuration management for the Scrivener kernel.
//!
//! Settings come from built-in defaults overridden by environment variables
//! with the `SCRIVENER` prefix and `__` as the section separator, for
//! example `SCRIVENER__INFERENCE__MODEL=gpt-4o`.
//!
//! # Example
//!
//! ```
//! use scrivener_kernel::infrastructure::config::Settings;
//!
//! let settings = Settings::new().expect("Failed to load configuration");
//! assert!(settings.sessions.max_concurrent_sessions > 0);
//! ```

pub mod inference;
pub mod sessions;
pub mod store;
pub mod telemetry;

pub use inference::InferenceSettings;
pub use sessions::SessionSettings;
pub use store::StoreSettings;
pub use telemetry::TelemetrySettings;

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Prefix of environment variables read by [`Settings::new`].
pub const ENV_PREFIX: &str = "SCRIVENER";

/// Top-level configuration for the Scrivener kernel.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Telemetry settings.
    #[serde(default)]
    pub telemetry: TelemetrySettings,
    /// Token source settings.
    #[serde(default)]
    pub inference: InferenceSettings,
    /// Document store settings.
    #[serde(default)]
    pub store: StoreSettings,
    /// Session manager settings.
    #[serde(default)]
    pub sessions: SessionSettings,
}

impl Settings {
    /// Creates a new settings instance from environment variables and defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be built or deserialized.
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_environment(Environment::with_prefix(ENV_PREFIX).separator("__"))
    }

    /// Creates settings from defaults overridden by the given environment source.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be built or deserialized.
    pub fn with_environment(environment: Environment) -> Result<Self, ConfigError> {
        let s = Config::builder()
            // Start with default values
            .set_default("telemetry.service_name", telemetry::DEFAULT_SERVICE_NAME)?
            .set_default("telemetry.log_level", telemetry::DEFAULT_LOG_LEVEL)?
            .set_default("inference.base_url", inference::DEFAULT_BASE_URL)?
            .set_default("inference.model", inference::DEFAULT_MODEL)?
            .set_default("store.base_url", store::DEFAULT_BASE_URL)?
            // Merge in Environment variables
            .add_source(environment)
            .build()?;

        s.try_deserialize()
    }
}
