//! Reconfigurable structured logging.
//!
//! The subscriber is assembled once, with reloadable filter and format
//! layers, so the bootstrap logger can be switched to the resolved settings
//! without replacing the global dispatcher.
//!
//! # Example
//!
//! ```rust,ignore
//! use theta_config::ConfigResolver;
//! use theta_telemetry::Logging;
//!
//! let logging = Logging::bootstrap()?;
//! let config = ConfigResolver::new().resolve()?;
//! logging.configure(&config.logger)?;
//!
//! tracing::info!(port = config.server.port, "Configuration ready");
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use theta_config::{LoggerConfig, MODE_ENV_VAR};
use tracing::level_filters::LevelFilter;
use tracing::{debug, Dispatch};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::{reload, EnvFilter, Layer, Registry};

use crate::{LogFormat, LogOutput, LogSettings, TelemetryError, TelemetryResult};

type FilteredRegistry = Layered<reload::Layer<EnvFilter, Registry>, Registry>;
type FormatLayer = Box<dyn Layer<FilteredRegistry> + Send + Sync>;

/// Handle to the process logging pipeline.
///
/// Cloning is cheap; every clone controls the same pipeline.
#[derive(Clone)]
pub struct Logging {
    filter: reload::Handle<EnvFilter, Registry>,
    format: reload::Handle<FormatLayer, FilteredRegistry>,
    settings: Arc<RwLock<LogSettings>>,
}

impl fmt::Debug for Logging {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logging")
            .field("settings", &*self.settings.read())
            .finish_non_exhaustive()
    }
}

impl Logging {
    /// Build a logging pipeline without installing it.
    ///
    /// The returned dispatch can be installed globally, scoped with
    /// [`tracing::dispatcher::with_default`], or handed to a
    /// `ConfigResolver`.
    #[must_use]
    pub fn build(settings: LogSettings) -> (Self, Dispatch) {
        let (filter_layer, filter) = reload::Layer::new(level_filter(settings.level));
        let (format_layer, format) = reload::Layer::new(format_layer(&settings));

        let subscriber = tracing_subscriber::registry()
            .with(filter_layer)
            .with(format_layer);

        let logging = Self {
            filter,
            format,
            settings: Arc::new(RwLock::new(settings)),
        };
        (logging, Dispatch::new(subscriber))
    }

    /// Build a logging pipeline and install it as the global default.
    ///
    /// # Errors
    ///
    /// Returns `TelemetryError::LoggingInit` if a global subscriber is
    /// already installed.
    pub fn install(settings: LogSettings) -> TelemetryResult<Self> {
        let (logging, dispatch) = Self::build(settings);
        tracing::dispatcher::set_global_default(dispatch)
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
        Ok(logging)
    }

    /// Install the bootstrap logger.
    ///
    /// The level depends on the `ENVIRONMENT` variable, read directly since
    /// no configuration exists yet.
    ///
    /// # Errors
    ///
    /// Same as [`install`](Self::install).
    pub fn bootstrap() -> TelemetryResult<Self> {
        let mode = std::env::var(MODE_ENV_VAR).ok();
        let settings = LogSettings::bootstrap(mode.as_deref());
        let logging = Self::install(settings)?;

        debug!(
            environment = mode.as_deref().unwrap_or(""),
            level = %settings.level,
            add_source = settings.add_source,
            "Bootstrap logger initialized"
        );
        Ok(logging)
    }

    /// Reconfigure from a resolved `logger` section.
    ///
    /// Returns the settings now in effect.
    ///
    /// # Errors
    ///
    /// Returns `TelemetryError::Reload` if the pipeline is gone.
    pub fn configure(&self, logger: &LoggerConfig) -> TelemetryResult<LogSettings> {
        let settings = LogSettings::from_logger(logger);
        self.apply(settings)?;
        Ok(settings)
    }

    /// Switch to `settings`.
    ///
    /// # Errors
    ///
    /// Returns `TelemetryError::Reload` if the pipeline is gone.
    pub fn apply(&self, settings: LogSettings) -> TelemetryResult<()> {
        {
            let mut current = self.settings.write();
            self.filter
                .reload(level_filter(settings.level))
                .map_err(|e| TelemetryError::Reload(e.to_string()))?;
            self.format
                .reload(format_layer(&settings))
                .map_err(|e| TelemetryError::Reload(e.to_string()))?;
            *current = settings;
        }

        debug!(
            level = %settings.level,
            format = %settings.format,
            output = %settings.output,
            add_source = settings.add_source,
            "Logger reconfigured"
        );
        Ok(())
    }

    /// Settings currently in effect.
    pub fn settings(&self) -> LogSettings {
        *self.settings.read()
    }
}

fn level_filter(level: LevelFilter) -> EnvFilter {
    EnvFilter::default().add_directive(level.into())
}

fn format_layer(settings: &LogSettings) -> FormatLayer {
    let writer = match settings.output {
        LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
    };

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_file(settings.add_source)
        .with_line_number(settings.add_source)
        .with_target(true);

    match settings.format {
        LogFormat::Text => layer.with_ansi(false).boxed(),
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Pretty => layer.pretty().boxed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    fn enabled_under(dispatch: &Dispatch, level: Level) -> bool {
        tracing::dispatcher::with_default(dispatch, || match level {
            Level::TRACE => tracing::enabled!(Level::TRACE),
            Level::DEBUG => tracing::enabled!(Level::DEBUG),
            Level::INFO => tracing::enabled!(Level::INFO),
            Level::WARN => tracing::enabled!(Level::WARN),
            _ => tracing::enabled!(Level::ERROR),
        })
    }

    #[test]
    fn test_build_keeps_settings() {
        let settings = LogSettings::bootstrap(Some("production"));
        let (logging, _dispatch) = Logging::build(settings);
        assert_eq!(logging.settings(), settings);
    }

    #[test]
    fn test_configure_updates_settings() {
        let (logging, _dispatch) = Logging::build(LogSettings::default());

        let logger = LoggerConfig {
            level: "warn".to_string(),
            format: "json".to_string(),
            output: "stderr".to_string(),
            add_source: true,
        };
        let applied = logging.configure(&logger).unwrap();

        assert_eq!(applied.level, LevelFilter::WARN);
        assert_eq!(logging.settings(), applied);

        // Clones share the pipeline.
        let clone = logging.clone();
        clone.apply(LogSettings::default()).unwrap();
        assert_eq!(logging.settings(), LogSettings::default());
    }

    #[test]
    fn test_reload_changes_level() {
        let (logging, dispatch) = Logging::build(LogSettings {
            level: LevelFilter::ERROR,
            ..LogSettings::default()
        });
        assert!(enabled_under(&dispatch, Level::ERROR));
        assert!(!enabled_under(&dispatch, Level::INFO));

        logging
            .apply(LogSettings {
                level: LevelFilter::DEBUG,
                format: LogFormat::Pretty,
                ..LogSettings::default()
            })
            .unwrap();
        assert!(enabled_under(&dispatch, Level::DEBUG));
        assert!(!enabled_under(&dispatch, Level::TRACE));
    }

    #[test]
    fn test_debug_shows_settings() {
        let (logging, _dispatch) = Logging::build(LogSettings::default());
        assert!(format!("{logging:?}").contains("Stdout"));
    }
}
