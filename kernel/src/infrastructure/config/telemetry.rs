//! Telemetry configuration for the Scrivener kernel.
//!
//! This module defines logging settings.

use serde::Deserialize;

pub(super) const DEFAULT_SERVICE_NAME: &str = "scrivener";
pub(super) const DEFAULT_LOG_LEVEL: &str = "info";

/// Telemetry configuration settings.
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetrySettings {
    /// Service name attached to log output.
    #[serde(default = "default_service_name")]
    pub service_name: String,
    /// Filter used when `RUST_LOG` is not set (default: "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit JSON lines instead of compact text (default: false)
    #[serde(default)]
    pub json: bool,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            log_level: default_log_level(),
            json: false,
        }
    }
}

fn default_service_name() -> String {
    DEFAULT_SERVICE_NAME.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
