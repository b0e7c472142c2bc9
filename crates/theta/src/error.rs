//! Error types for the Theta binary.

use thiserror::Error;

use theta_config::ConfigError;
use theta_telemetry::TelemetryError;

/// Errors that end the process with a non-zero exit code.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad command line.
    #[error("{message}")]
    Usage {
        /// Error message.
        message: String,
    },

    /// Configuration could not be resolved.
    #[error("Failed to resolve configuration")]
    Resolve(#[source] ConfigError),

    /// Configuration resolved but is not usable.
    #[error("Invalid configuration")]
    Invalid(#[source] ConfigError),

    /// Logging could not be set up.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Create a usage error.
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }
}

/// Result type for the binary.
pub type AppResult<T> = Result<T, AppError>;
