//! Logging settings.
//!
//! [`LogSettings`] is the interpreted form of the `logger` configuration
//! section. Values that cannot be interpreted fall back to a safe default
//! with a warning instead of failing.

use std::fmt;
use std::str::FromStr;

use theta_config::{Environment, LoggerConfig};
use tracing::level_filters::LevelFilter;
use tracing::warn;

use crate::TelemetryError;

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Single-line `key=value` text.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
    /// Multi-line, human-oriented output.
    Pretty,
}

impl LogFormat {
    /// Configuration name of the format.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Pretty => "pretty",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            _ => Err(TelemetryError::InvalidSetting {
                setting: "format",
                value: s.to_string(),
            }),
        }
    }
}

/// Log destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogOutput {
    /// Standard output.
    #[default]
    Stdout,
    /// Standard error.
    Stderr,
}

impl LogOutput {
    /// Configuration name of the destination.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

impl fmt::Display for LogOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogOutput {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdout" => Ok(Self::Stdout),
            "stderr" => Ok(Self::Stderr),
            _ => Err(TelemetryError::InvalidSetting {
                setting: "output",
                value: s.to_string(),
            }),
        }
    }
}

/// Parse a log level name.
///
/// Accepts `trace`, `debug`, `info`, `warn` (or `warning`) and `error`,
/// ignoring case and surrounding whitespace.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidSetting` for any other value.
pub fn parse_level(s: &str) -> Result<LevelFilter, TelemetryError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok(LevelFilter::TRACE),
        "debug" => Ok(LevelFilter::DEBUG),
        "info" => Ok(LevelFilter::INFO),
        "warn" | "warning" => Ok(LevelFilter::WARN),
        "error" => Ok(LevelFilter::ERROR),
        _ => Err(TelemetryError::InvalidSetting {
            setting: "level",
            value: s.to_string(),
        }),
    }
}

/// Interpreted logging settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogSettings {
    /// Most verbose level that is emitted.
    pub level: LevelFilter,
    /// Line format.
    pub format: LogFormat,
    /// Destination.
    pub output: LogOutput,
    /// Include source file and line.
    pub add_source: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: LevelFilter::INFO,
            format: LogFormat::Text,
            output: LogOutput::Stdout,
            add_source: false,
        }
    }
}

impl LogSettings {
    /// Settings used before any configuration has been resolved.
    ///
    /// Production logs errors only; every other mode (including an unset or
    /// unknown one) logs at debug. Output is always text on stdout.
    ///
    /// # Example
    ///
    /// ```
    /// use theta_telemetry::LogSettings;
    /// use tracing::level_filters::LevelFilter;
    ///
    /// assert_eq!(LogSettings::bootstrap(Some("production")).level, LevelFilter::ERROR);
    /// assert_eq!(LogSettings::bootstrap(None).level, LevelFilter::DEBUG);
    /// ```
    #[must_use]
    pub fn bootstrap(mode: Option<&str>) -> Self {
        let production = mode
            .and_then(|raw| raw.parse::<Environment>().ok())
            .is_some_and(|mode| mode == Environment::Production);

        Self {
            level: if production {
                LevelFilter::ERROR
            } else {
                LevelFilter::DEBUG
            },
            ..Self::default()
        }
    }

    /// Interpret a resolved `logger` section.
    ///
    /// An unknown level falls back to `info`, an unknown format to `text`
    /// and an unknown output to `stdout`; each fallback is logged as a
    /// warning.
    #[must_use]
    pub fn from_logger(logger: &LoggerConfig) -> Self {
        let level = parse_level(&logger.level).unwrap_or_else(|e| {
            warn!(error = %e, fallback = "info", "Unknown log level");
            LevelFilter::INFO
        });
        let format = logger.format.parse().unwrap_or_else(|e| {
            warn!(error = %e, fallback = %LogFormat::Text, "Unknown log format");
            LogFormat::Text
        });
        let output = logger.output.parse().unwrap_or_else(|e| {
            warn!(error = %e, fallback = %LogOutput::Stdout, "Unknown log output");
            LogOutput::Stdout
        });

        Self {
            level,
            format,
            output,
            add_source: logger.add_source,
        }
    }
}
