//! Main configuration types.
//!
//! This module provides the top-level [`ThetaConfig`] struct and the
//! deployment-mode selector [`Environment`].

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::binding::{join_path, FieldBinding, FieldSlot, FieldVisitor, Section};
use crate::coerce::FieldKind;
use crate::{ConfigError, DatabaseConfig, LoggerConfig, ServerConfig, TestConfig};

/// Environment variable that selects the deployment mode.
pub const MODE_ENV_VAR: &str = "ENVIRONMENT";

/// Deployment mode.
///
/// The mode decides which `config.<mode>.json` file is layered over the base
/// file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development (the fallback for missing or unknown values).
    #[default]
    Development,
    /// Automated test runs.
    Test,
    /// Pre-production.
    Staging,
    /// Production.
    Production,
}

impl Environment {
    /// Every valid mode, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Development,
        Self::Test,
        Self::Staging,
        Self::Production,
    ];

    /// Name used in file names and log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| {
                ConfigError::invalid_value(
                    MODE_ENV_VAR,
                    format!("unknown deployment mode '{s}', expected development, test, staging or production"),
                )
            })
    }
}

/// Complete Theta service configuration.
///
/// This is the root configuration type that contains all configuration
/// sections. Use [`ConfigResolver`](crate::ConfigResolver) to resolve it from
/// files and environment variables.
///
/// # Example
///
/// ```
/// use theta_config::{Environment, ThetaConfig};
///
/// let config = ThetaConfig::default();
/// assert_eq!(config.environment, Environment::Development);
/// assert_eq!(config.server.port, 8080);
/// ```
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
pub struct ThetaConfig {
    /// Deployment mode the configuration was resolved for.
    pub environment: Environment,

    /// Logging configuration.
    pub logger: LoggerConfig,

    /// HTTP server configuration.
    pub server: ServerConfig,

    /// Database configuration.
    pub database: DatabaseConfig,

    /// Diagnostic labels.
    pub test: TestConfig,
}

impl Section for ThetaConfig {
    fn walk(&mut self, visitor: &mut dyn FieldVisitor) {
        visitor.section("logger", &mut self.logger);
        visitor.section("server", &mut self.server);
        visitor.section("database", &mut self.database);
        visitor.section("test", &mut self.test);
    }
}

impl ThetaConfig {
    /// Defaults for the given deployment mode.
    #[must_use]
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            environment,
            ..Self::default()
        }
    }

    /// Validate the configuration.
    ///
    /// Only basic range and presence checks are made.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` or `ConfigError::ValidationError`
    /// describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::invalid_value("server.host", "must not be empty"));
        }
        if self.server.port == 0 {
            return Err(ConfigError::invalid_value(
                "server.port",
                "must be between 1 and 65535",
            ));
        }

        let level = self.logger.level.trim().to_ascii_lowercase();
        if !matches!(
            level.as_str(),
            "trace" | "debug" | "info" | "warn" | "warning" | "error"
        ) {
            return Err(ConfigError::invalid_value(
                "logger.level",
                format!("unknown log level '{}'", self.logger.level),
            ));
        }

        let database = &self.database;
        if database.host.trim().is_empty() {
            return Err(ConfigError::invalid_value("database.host", "must not be empty"));
        }
        if database.name.trim().is_empty() {
            return Err(ConfigError::invalid_value("database.name", "must not be empty"));
        }
        if database.atlas.enabled {
            if database.user.is_empty() || database.password.is_empty() {
                return Err(ConfigError::validation_error(
                    "database.user and database.password are required for Atlas connections",
                ));
            }
        } else if database.port == 0 {
            return Err(ConfigError::invalid_value(
                "database.port",
                "must be between 1 and 65535",
            ));
        }

        Ok(())
    }

    /// List every environment-variable binding in schema order.
    ///
    /// # Example
    ///
    /// ```
    /// use theta_config::ThetaConfig;
    ///
    /// let bindings = ThetaConfig::env_bindings();
    /// let port = bindings.iter().find(|b| b.env == "SERVER_PORT").unwrap();
    /// assert_eq!(port.path, "server.port");
    /// ```
    pub fn env_bindings() -> Vec<EnvBinding> {
        let mut collector = BindingCollector::default();
        Self::default().walk(&mut collector);
        collector.bindings
    }
}

/// One field that can be overridden from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvBinding {
    /// Dotted path of the field.
    pub path: String,
    /// Environment variable name.
    pub env: &'static str,
    /// Field kind.
    pub kind: FieldKind,
    /// Whether the field holds a secret.
    pub sensitive: bool,
}

#[derive(Default)]
struct BindingCollector {
    prefix: String,
    bindings: Vec<EnvBinding>,
}

impl FieldVisitor for BindingCollector {
    fn field(&mut self, binding: &FieldBinding, slot: FieldSlot<'_>) {
        if let Some(env) = binding.env {
            self.bindings.push(EnvBinding {
                path: join_path(&self.prefix, binding.key),
                env,
                kind: slot.kind(),
                sensitive: binding.sensitive,
            });
        }
    }

    fn section(&mut self, key: &'static str, section: &mut dyn Section) {
        let parent = std::mem::take(&mut self.prefix);
        self.prefix = join_path(&parent, key);
        section.walk(self);
        self.prefix = parent;
    }
}
