//! Telemetry error types.

use thiserror::Error;

/// Errors that can occur during telemetry operations.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Failed to initialize logging.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// Failed to swap the active logging settings.
    #[error("Failed to reconfigure logging: {0}")]
    Reload(String),

    /// A logging setting could not be interpreted.
    #[error("Invalid logging setting {setting}: {value}")]
    InvalidSetting {
        /// Name of the setting.
        setting: &'static str,
        /// Rejected value.
        value: String,
    },
}
