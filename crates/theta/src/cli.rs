//! Command-line arguments.

use std::path::PathBuf;

use theta_config::{DEFAULT_CONFIG_DIR, DEFAULT_DOTENV_PATH};

use crate::{AppError, AppResult};

/// What the process was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Resolve and validate the configuration.
    Run(Args),
    /// Print usage and exit.
    Help,
    /// Print the version and exit.
    Version,
}

/// Options for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    /// Directory holding `config*.json`.
    pub config_dir: PathBuf,
    /// Dotenv file.
    pub dotenv: PathBuf,
    /// Print the resolved configuration as JSON.
    pub print_config: bool,
    /// Print the environment variable bindings and exit.
    pub list_env: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            dotenv: PathBuf::from(DEFAULT_DOTENV_PATH),
            print_config: false,
            list_env: false,
        }
    }
}

impl Command {
    /// Parse the process arguments.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Usage` for unknown flags or missing values.
    pub fn parse() -> AppResult<Self> {
        Self::parse_from(std::env::args().skip(1))
    }

    /// Parse `args`, not including the program name.
    ///
    /// `--help` and `--version` win as soon as they are seen.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Usage` for unknown flags or missing values.
    pub fn parse_from<I>(args: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let mut parsed = Args::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config-dir" | "-c" => {
                    parsed.config_dir = PathBuf::from(value_for(&arg, args.next())?);
                }
                "--dotenv" | "-e" => {
                    parsed.dotenv = PathBuf::from(value_for(&arg, args.next())?);
                }
                "--print-config" | "-p" => parsed.print_config = true,
                "--list-env" => parsed.list_env = true,
                "--help" | "-h" => return Ok(Self::Help),
                "--version" | "-v" => return Ok(Self::Version),
                other => return Err(AppError::usage(format!("Unknown argument: {other}"))),
            }
        }

        Ok(Self::Run(parsed))
    }
}

fn value_for(flag: &str, value: Option<String>) -> AppResult<String> {
    value
        .filter(|v| !v.starts_with('-'))
        .ok_or_else(|| AppError::usage(format!("Missing value for {flag}")))
}

/// Usage text.
pub fn help() -> String {
    format!(
        r"Theta - layered configuration resolution

USAGE:
    theta [OPTIONS]

OPTIONS:
    -c, --config-dir <DIR>   Directory holding config*.json (default: {DEFAULT_CONFIG_DIR})
    -e, --dotenv <PATH>      Dotenv file (default: {DEFAULT_DOTENV_PATH})
    -p, --print-config       Print the resolved configuration as JSON
        --list-env           List the environment variables that override fields
    -h, --help               Print help information
    -v, --version            Print version information

FILES (in precedence order, lowest first):
    config.json              Base configuration (required)
    config.<mode>.json       Mode configuration (development, test, staging, production)
    config.local.json        Local overrides
    .env                     Dotenv overrides

ENVIRONMENT VARIABLES:
    ENVIRONMENT              Deployment mode (default: development)
    SERVER_PORT, SLOG_LEVEL, ...
                             Field overrides, see --list-env

EXAMPLES:
    # Resolve from ./configs and print the result
    theta --print-config

    # Production settings with a port override
    ENVIRONMENT=production SERVER_PORT=9000 theta -c /etc/theta
"
    )
}
