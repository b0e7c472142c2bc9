//! Startup sequence: resolve, reconfigure logging, validate.

use std::fmt::Write as _;

use theta_config::{ConfigResolver, Resolution, ThetaConfig};
use theta_telemetry::Logging;
use tracing::info;

use crate::{AppError, AppResult, Args};

/// Resolver for the given arguments, reading the process environment.
pub fn resolver_for(args: &Args) -> ConfigResolver {
    ConfigResolver::new()
        .with_config_dir(&args.config_dir)
        .with_dotenv_path(&args.dotenv)
}

/// Resolve the configuration, switch logging to it and validate it.
///
/// # Errors
///
/// Returns `AppError::Resolve` if the base file cannot be used,
/// `AppError::Telemetry` if logging cannot be reconfigured and
/// `AppError::Invalid` if the result fails validation.
pub fn start(resolver: &ConfigResolver, logging: &Logging) -> AppResult<Resolution> {
    let resolution = resolver.resolve_with_report().map_err(AppError::Resolve)?;
    logging.configure(&resolution.config.logger)?;

    resolution.config.validate().map_err(AppError::Invalid)?;

    let config = &resolution.config;
    info!(
        environment = %config.environment,
        host = %config.server.host,
        port = config.server.port,
        overrides = resolution.overrides.applied.len(),
        rejected = resolution.overrides.rejected.len(),
        "Configuration ready"
    );
    Ok(resolution)
}

/// Pretty JSON rendering of `config` with credentials masked.
///
/// # Errors
///
/// Returns `AppError::Json` if serialization fails.
pub fn render_config(config: &ThetaConfig) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(config)?)
}

/// Table of every environment variable that overrides a field.
pub fn render_env_bindings() -> String {
    let mut out = format!("{:<26} {:<28} {}\n", "VARIABLE", "FIELD", "TYPE");
    for binding in ThetaConfig::env_bindings() {
        let secret = if binding.sensitive { " (secret)" } else { "" };
        // Writing to a String cannot fail.
        let _ = writeln!(
            out,
            "{:<26} {:<28} {}{secret}",
            binding.env, binding.path, binding.kind
        );
    }
    out
}
