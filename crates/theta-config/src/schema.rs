//! Configuration schema types.
//!
//! This module defines the structure of all configuration sections and the
//! field bindings that tie each scalar to its document key and environment
//! variable.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::binding::{FieldBinding, FieldVisitor, Section};

/// Logging configuration section.
///
/// Values are kept as text here; the logging facility decides how to
/// interpret them.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LoggerConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,

    /// Log format (text, json, pretty).
    pub format: String,

    /// Output destination (stdout, stderr).
    pub output: String,

    /// Include source file and line in logs.
    pub add_source: bool,
}

impl LoggerConfig {
    const LEVEL: FieldBinding = FieldBinding::new("level", "SLOG_LEVEL");
    const FORMAT: FieldBinding = FieldBinding::new("format", "SLOG_FORMAT");
    const OUTPUT: FieldBinding = FieldBinding::new("output", "SLOG_OUTPUT");
    const ADD_SOURCE: FieldBinding = FieldBinding::new("add_source", "SLOG_ADD_SOURCE");
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "debug".to_string(),
            format: "text".to_string(),
            output: "stdout".to_string(),
            add_source: true,
        }
    }
}

impl Section for LoggerConfig {
    fn walk(&mut self, visitor: &mut dyn FieldVisitor) {
        visitor.field(&Self::LEVEL, (&mut self.level).into());
        visitor.field(&Self::FORMAT, (&mut self.format).into());
        visitor.field(&Self::OUTPUT, (&mut self.output).into());
        visitor.field(&Self::ADD_SOURCE, (&mut self.add_source).into());
    }
}

/// HTTP server configuration section.
///
/// # Example
///
/// ```
/// use theta_config::ServerConfig;
///
/// let config = ServerConfig {
///     port: 9000,
///     host: "0.0.0.0".to_string(),
///     ..Default::default()
/// };
/// assert_eq!(config.shutdown_timeout, 15);
/// ```
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ServerConfig {
    /// HTTP server port.
    pub port: u16,

    /// Bind host.
    pub host: String,

    /// Request read timeout in seconds.
    pub read_timeout: u64,

    /// Response write timeout in seconds.
    pub write_timeout: u64,

    /// Graceful shutdown timeout in seconds.
    pub shutdown_timeout: u64,
}

impl ServerConfig {
    const PORT: FieldBinding = FieldBinding::new("port", "SERVER_PORT");
    const HOST: FieldBinding = FieldBinding::new("host", "SERVER_HOST");
    const READ_TIMEOUT: FieldBinding = FieldBinding::new("read_timeout", "SERVER_READ_TIMEOUT");
    const WRITE_TIMEOUT: FieldBinding = FieldBinding::new("write_timeout", "SERVER_WRITE_TIMEOUT");
    const SHUTDOWN_TIMEOUT: FieldBinding =
        FieldBinding::new("shutdown_timeout", "SERVER_SHUTDOWN_TIMEOUT");
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "localhost".to_string(),
            read_timeout: 30,
            write_timeout: 30,
            shutdown_timeout: 15,
        }
    }
}

impl Section for ServerConfig {
    fn walk(&mut self, visitor: &mut dyn FieldVisitor) {
        visitor.field(&Self::PORT, (&mut self.port).into());
        visitor.field(&Self::HOST, (&mut self.host).into());
        visitor.field(&Self::READ_TIMEOUT, (&mut self.read_timeout).into());
        visitor.field(&Self::WRITE_TIMEOUT, (&mut self.write_timeout).into());
        visitor.field(&Self::SHUTDOWN_TIMEOUT, (&mut self.shutdown_timeout).into());
    }
}

/// MongoDB Atlas settings, nested under `database.atlas`.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct AtlasConfig {
    /// Connect through an Atlas SRV record instead of host and port.
    pub enabled: bool,

    /// Application name reported to Atlas.
    pub app_name: String,
}

impl AtlasConfig {
    const ENABLED: FieldBinding = FieldBinding::new("enabled", "DATABASE_IS_ATLAS");
    const APP_NAME: FieldBinding = FieldBinding::new("app_name", "DATABASE_ATLAS_APP_NAME");
}

impl Section for AtlasConfig {
    fn walk(&mut self, visitor: &mut dyn FieldVisitor) {
        visitor.field(&Self::ENABLED, (&mut self.enabled).into());
        visitor.field(&Self::APP_NAME, (&mut self.app_name).into());
    }
}

/// Database connection section.
///
/// `Debug` and `Serialize` redact the credentials.
#[derive(Clone, Serialize, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Database server host.
    pub host: String,

    /// Database server port.
    pub port: u16,

    /// Authentication user.
    #[serde(serialize_with = "redacted")]
    pub user: String,

    /// Authentication password.
    #[serde(serialize_with = "redacted")]
    pub password: String,

    /// Database name.
    pub name: String,

    /// Atlas settings.
    pub atlas: AtlasConfig,
}

impl DatabaseConfig {
    const HOST: FieldBinding = FieldBinding::new("host", "DATABASE_HOST");
    const PORT: FieldBinding = FieldBinding::new("port", "DATABASE_PORT");
    const USER: FieldBinding = FieldBinding::new("user", "DATABASE_USER").sensitive();
    const PASSWORD: FieldBinding = FieldBinding::new("password", "DATABASE_PASSWORD").sensitive();
    const NAME: FieldBinding = FieldBinding::new("name", "DATABASE_NAME");
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 27017,
            user: "user".to_string(),
            password: "pass".to_string(),
            name: "database".to_string(),
            atlas: AtlasConfig::default(),
        }
    }
}

impl Section for DatabaseConfig {
    fn walk(&mut self, visitor: &mut dyn FieldVisitor) {
        visitor.field(&Self::HOST, (&mut self.host).into());
        visitor.field(&Self::PORT, (&mut self.port).into());
        visitor.field(&Self::USER, (&mut self.user).into());
        visitor.field(&Self::PASSWORD, (&mut self.password).into());
        visitor.field(&Self::NAME, (&mut self.name).into());
        visitor.section("atlas", &mut self.atlas);
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &mask(&self.user))
            .field("password", &mask(&self.password))
            .field("name", &self.name)
            .field("atlas", &self.atlas)
            .finish()
    }
}

/// Placeholder shown instead of a secret.
pub const REDACTED: &str = "***MASKED***";

fn mask(value: &str) -> &'static str {
    if value.is_empty() {
        ""
    } else {
        REDACTED
    }
}

#[allow(clippy::ptr_arg)]
fn redacted<S: Serializer>(value: &String, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(mask(value))
}

/// Diagnostic labels used to check which layer supplied a value.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct TestConfig {
    /// Label expected to come from the base file.
    pub label_def: String,

    /// Label expected to come from the mode-specific file.
    pub label_env: String,

    /// Label expected to come from the local file or the environment.
    pub label_override: String,
}

impl TestConfig {
    const LABEL_DEF: FieldBinding = FieldBinding::new("label_def", "TEST_LABEL_DEF");
    const LABEL_ENV: FieldBinding = FieldBinding::new("label_env", "TEST_LABEL_ENV");
    const LABEL_OVERRIDE: FieldBinding =
        FieldBinding::new("label_override", "TEST_LABEL_OVERRIDE");
}

impl Section for TestConfig {
    fn walk(&mut self, visitor: &mut dyn FieldVisitor) {
        visitor.field(&Self::LABEL_DEF, (&mut self.label_def).into());
        visitor.field(&Self::LABEL_ENV, (&mut self.label_env).into());
        visitor.field(&Self::LABEL_OVERRIDE, (&mut self.label_override).into());
    }
}
