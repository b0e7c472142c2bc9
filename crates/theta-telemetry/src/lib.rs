//! Structured logging for Theta services.
//!
//! This crate owns the process logging pipeline:
//!
//! - **Bootstrap**: a text logger on stdout installed before any
//!   configuration exists, at `error` in production and `debug` otherwise
//! - **Reconfiguration**: level, format, output and source locations switched
//!   in place once the `logger` section has been resolved
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                   Registry                    │
//! │   ┌──────────────────┐  ┌──────────────────┐  │
//! │   │  reload: filter  │→ │  reload: format  │  │
//! │   │   (EnvFilter)    │  │ (text/json/pretty)│  │
//! │   └──────────────────┘  └────────┬─────────┘  │
//! └──────────────────────────────────┼────────────┘
//!                                    ▼
//!                            stdout / stderr
//! ```
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
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod logging;

pub use config::{parse_level, LogFormat, LogOutput, LogSettings};
pub use error::TelemetryError;
pub use logging::Logging;

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
