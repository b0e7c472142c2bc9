//! Configuration error types.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while resolving configuration.
///
/// Only a failure of the mandatory base file ever escapes
/// [`ConfigResolver::resolve`](crate::ConfigResolver::resolve); the other
/// variants are reported to callers of the individual loaders so they can
/// decide between aborting and skipping.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The process is not allowed to read the configuration file.
    #[error("permission denied reading configuration file: {path}")]
    PermissionDenied {
        /// Path to the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to read configuration file.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// JSON syntax error.
    #[error("failed to parse JSON configuration {path}: {source}")]
    ParseError {
        /// Path to the file.
        path: PathBuf,
        /// Underlying parser error.
        #[source]
        source: serde_json::Error,
    },

    /// The document parsed but is not a JSON object at the top level.
    #[error("configuration document {path} must be a JSON object, found {found}")]
    InvalidDocument {
        /// Path to the file.
        path: PathBuf,
        /// JSON type that was found instead.
        found: &'static str,
    },

    /// A key holds a value of the wrong type or outside the field's range.
    #[error("invalid configuration value for {field}: {reason}")]
    InvalidValue {
        /// Dotted path of the field.
        field: String,
        /// Explanation of why the value is invalid.
        reason: String,
    },

    /// Validation error after loading.
    #[error("configuration validation failed: {0}")]
    ValidationError(String),
}

impl ConfigError {
    /// Create a new file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Classify an I/O error raised while reading `path`.
    pub fn from_io(path: &Path, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::file_not_found(path),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                path: path.to_path_buf(),
                source,
            },
            _ => Self::ReadError {
                path: path.to_path_buf(),
                source,
            },
        }
    }

    /// Create a new invalid value error.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a new validation error.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// Whether this error means the file simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::FileNotFound { .. })
    }

    /// Whether the file exists but its content was rejected.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::ParseError { .. } | Self::InvalidDocument { .. } | Self::InvalidValue { .. }
        )
    }
}
