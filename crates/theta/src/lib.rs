//! Theta service entry point.
//!
//! The `theta` binary resolves the layered configuration once at startup,
//! switches the bootstrap logger to the resolved `logger` section and
//! validates the result before anything else runs.
//!
//! # Startup Sequence
//!
//! ```text
//!   bootstrap logger (ENVIRONMENT → error | debug)
//!          │
//!          ▼
//!   ConfigResolver::resolve_with_report
//!     defaults → config.json → config.<mode>.json → config.local.json
//!              → .env → process environment
//!          │
//!          ▼
//!   Logging::configure(&config.logger)
//!          │
//!          ▼
//!   ThetaConfig::validate ──✗──► exit 1
//! ```
//!
//! # Example Usage
//!
//! ```bash
//! # Resolve from ./configs and print the result
//! $ theta --print-config
//!
//! # Staging mode with an override
//! $ ENVIRONMENT=staging SLOG_LEVEL=warn theta --config-dir /etc/theta
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod app;
pub mod cli;
pub mod error;

pub use app::{render_config, render_env_bindings, resolver_for, start};
pub use cli::{Args, Command};
pub use error::{AppError, AppResult};

/// Theta version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
