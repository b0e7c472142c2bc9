//! Hierarchical configuration resolution for Theta.
//!
//! This crate resolves one strongly-typed [`ThetaConfig`] from layered
//! sources, lowest precedence first:
//! - Compiled-in defaults
//! - `config.json` (mandatory)
//! - `config.<mode>.json`, with the mode taken from `ENVIRONMENT`
//! - `config.local.json`
//! - A dotenv file
//! - The process environment
//!
//! # Overview
//!
//! The configuration is built around [`ThetaConfig`], which contains:
//!
//! - [`LoggerConfig`] - Logging level, format, output and source locations
//! - [`ServerConfig`] - HTTP server address and timeouts
//! - [`DatabaseConfig`] - Database connection settings
//! - [`TestConfig`] - Diagnostic labels for checking precedence
//!
//! JSON files merge by key presence: a key present in a file overwrites the
//! field, an absent key leaves it alone. Environment variables are bound to
//! individual fields through each section's [`Section`] schema and are
//! converted with [`coerce`].
//!
//! # Example
//!
//! ```no_run
//! use theta_config::ConfigResolver;
//!
//! # fn main() -> Result<(), theta_config::ConfigError> {
//! let config = ConfigResolver::new().with_config_dir("configs").resolve()?;
//! config.validate()?;
//!
//! println!("Server will listen on {}:{}", config.server.host, config.server.port);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```json
//! {
//!   "logger": { "level": "info", "format": "json", "add_source": false },
//!   "server": { "port": 8080, "host": "0.0.0.0", "shutdown_timeout": 15 },
//!   "database": { "host": "db.internal", "atlas": { "enabled": false } }
//! }
//! ```
//!
//! # Environment Variable Overrides
//!
//! Each field has its own variable, for example:
//!
//! - `SLOG_LEVEL=warn`
//! - `SERVER_PORT=9000`
//! - `DATABASE_IS_ATLAS=true`
//!
//! [`ThetaConfig::env_bindings`] lists them all.

#![warn(missing_docs)]

mod binding;
mod coerce;
mod config;
mod dotenv;
mod error;
mod loader;
mod overrides;
mod resolver;
mod schema;
mod source;

pub use binding::{FieldBinding, FieldSlot, FieldVisitor, Section};
pub use coerce::{coerce, CoerceError, FieldKind, FieldValue};
pub use config::*;
pub use dotenv::{read_dotenv, DotenvMap};
pub use error::ConfigError;
pub use loader::{load_into, merge_document};
pub use overrides::{
    apply_env_overrides, AppliedOverride, EnvSource, OverrideReport, ProcessEnv, RejectedOverride,
};
pub use resolver::{
    ConfigPaths, ConfigResolver, LayerOutcome, LayerReport, Resolution, DEFAULT_CONFIG_DIR,
    DEFAULT_DOTENV_PATH,
};
pub use schema::*;
pub use source::Source;
