//! Layered configuration resolution.
//!
//! This module provides the [`ConfigResolver`], the single entry point that
//! turns defaults, JSON files, a dotenv file and the process environment into
//! one [`ThetaConfig`].

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, info_span, warn, Dispatch};

use crate::overrides::{apply_env_overrides, EnvSource, OverrideReport, ProcessEnv};
use crate::{load_into, read_dotenv, ConfigError, Environment, Source, ThetaConfig, MODE_ENV_VAR};

/// Default directory holding the JSON configuration files.
pub const DEFAULT_CONFIG_DIR: &str = "configs";

/// Default dotenv file.
pub const DEFAULT_DOTENV_PATH: &str = ".env";

/// File locations used for one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    /// `config.json`, mandatory.
    pub base: PathBuf,
    /// `config.<mode>.json`.
    pub environment: PathBuf,
    /// `config.local.json`.
    pub local: PathBuf,
    /// The dotenv file.
    pub dotenv: PathBuf,
}

impl ConfigPaths {
    /// Paths for `mode` under `config_dir`.
    ///
    /// # Example
    ///
    /// ```
    /// use std::path::Path;
    /// use theta_config::{ConfigPaths, Environment};
    ///
    /// let paths = ConfigPaths::for_mode("configs", Environment::Staging, ".env");
    /// assert_eq!(paths.environment, Path::new("configs/config.staging.json"));
    /// ```
    pub fn for_mode(
        config_dir: impl AsRef<Path>,
        mode: Environment,
        dotenv: impl Into<PathBuf>,
    ) -> Self {
        let dir = config_dir.as_ref();
        Self {
            base: dir.join("config.json"),
            environment: dir.join(format!("config.{mode}.json")),
            local: dir.join("config.local.json"),
            dotenv: dotenv.into(),
        }
    }
}

/// What happened to one file layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerOutcome {
    /// The file was merged.
    Applied,
    /// The file does not exist.
    NotFound,
    /// The file exists but could not be used.
    Skipped {
        /// Rendered error.
        reason: String,
    },
}

/// Report for one file layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerReport {
    /// Which layer this is.
    pub source: Source,
    /// File that was tried.
    pub path: PathBuf,
    /// Outcome.
    pub outcome: LayerOutcome,
}

impl LayerReport {
    /// Whether the layer was merged.
    pub fn applied(&self) -> bool {
        self.outcome == LayerOutcome::Applied
    }
}

/// A resolved configuration together with how it was produced.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The merged configuration.
    pub config: ThetaConfig,
    /// Deployment mode used to pick the mode file.
    pub mode: Environment,
    /// File layers in the order they were tried.
    pub layers: Vec<LayerReport>,
    /// Number of entries read from the dotenv file.
    pub dotenv_entries: usize,
    /// Environment overrides.
    pub overrides: OverrideReport,
}

impl Resolution {
    /// Report for the given file layer.
    pub fn layer(&self, source: Source) -> Option<&LayerReport> {
        self.layers.iter().find(|layer| layer.source == source)
    }
}

/// Resolves the layered configuration.
///
/// Layers are applied from lowest to highest precedence:
/// 1. Compiled-in defaults
/// 2. `config.json` (mandatory)
/// 3. `config.<mode>.json`, where the mode comes from `ENVIRONMENT`
/// 4. `config.local.json`
/// 5. The dotenv file
/// 6. The process environment
///
/// Only a failure of the base file is fatal. Every other problem is logged
/// and the affected layer or field is skipped.
///
/// # Example
///
/// ```no_run
/// use theta_config::ConfigResolver;
///
/// # fn main() -> Result<(), theta_config::ConfigError> {
/// let config = ConfigResolver::new()
///     .with_config_dir("configs")
///     .with_dotenv_path(".env")
///     .resolve()?;
///
/// println!("Server will listen on {}:{}", config.server.host, config.server.port);
/// # Ok(())
/// # }
/// ```
pub struct ConfigResolver {
    config_dir: PathBuf,
    dotenv_path: PathBuf,
    env: Box<dyn EnvSource + Send + Sync>,
    dispatch: Option<Dispatch>,
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConfigResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigResolver")
            .field("config_dir", &self.config_dir)
            .field("dotenv_path", &self.dotenv_path)
            .field("dispatch", &self.dispatch.is_some())
            .finish_non_exhaustive()
    }
}

impl ConfigResolver {
    /// Create a resolver reading `configs/`, `.env` and the process
    /// environment, logging to the current dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            dotenv_path: PathBuf::from(DEFAULT_DOTENV_PATH),
            env: Box::new(ProcessEnv),
            dispatch: None,
        }
    }

    /// Directory holding `config*.json`.
    #[must_use]
    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = dir.into();
        self
    }

    /// Dotenv file to read.
    #[must_use]
    pub fn with_dotenv_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.dotenv_path = path.into();
        self
    }

    /// Environment to read `ENVIRONMENT` and the field bindings from.
    ///
    /// # Example
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use theta_config::ConfigResolver;
    ///
    /// let env = HashMap::from([("ENVIRONMENT".to_string(), "test".to_string())]);
    /// let resolver = ConfigResolver::new().with_env_source(env);
    /// ```
    #[must_use]
    pub fn with_env_source<E>(mut self, env: E) -> Self
    where
        E: EnvSource + Send + Sync + 'static,
    {
        self.env = Box::new(env);
        self
    }

    /// Send resolution events to `dispatch` instead of the current
    /// dispatcher.
    #[must_use]
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    /// File locations for `mode`.
    pub fn paths(&self, mode: Environment) -> ConfigPaths {
        ConfigPaths::for_mode(&self.config_dir, mode, self.dotenv_path.clone())
    }

    /// Resolve the configuration.
    ///
    /// # Errors
    ///
    /// Returns the `ConfigError` of the base file if it is missing,
    /// unreadable or malformed. No other layer can fail resolution.
    pub fn resolve(&self) -> Result<ThetaConfig, ConfigError> {
        self.resolve_with_report().map(|resolution| resolution.config)
    }

    /// Resolve the configuration and report what each layer contributed.
    ///
    /// # Errors
    ///
    /// Same as [`resolve`](Self::resolve).
    pub fn resolve_with_report(&self) -> Result<Resolution, ConfigError> {
        match &self.dispatch {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, || self.run()),
            None => self.run(),
        }
    }

    fn run(&self) -> Result<Resolution, ConfigError> {
        let _span = info_span!("config_resolution").entered();

        let mode = self.resolve_mode();
        let paths = self.paths(mode);
        info!(
            mode = %mode,
            config_dir = %self.config_dir.display(),
            "Resolving configuration"
        );

        let mut config = ThetaConfig::for_environment(mode);

        if let Err(e) = load_into(&paths.base, &mut config) {
            error!(
                file = %paths.base.display(),
                error = %e,
                "Failed to load base configuration"
            );
            return Err(e);
        }
        info!(file = %paths.base.display(), source = %Source::BaseFile, "Configuration layer applied");

        let layers = vec![
            LayerReport {
                source: Source::BaseFile,
                path: paths.base,
                outcome: LayerOutcome::Applied,
            },
            optional_layer(Source::EnvironmentFile, paths.environment, &mut config),
            optional_layer(Source::LocalFile, paths.local, &mut config),
        ];

        let dotenv = read_dotenv(&paths.dotenv);
        let overrides = apply_env_overrides(&mut config, &*self.env, &dotenv);

        info!(
            mode = %mode,
            overrides = overrides.applied.len(),
            rejected = overrides.rejected.len(),
            "Configuration resolved"
        );

        Ok(Resolution {
            config,
            mode,
            layers,
            dotenv_entries: dotenv.len(),
            overrides,
        })
    }

    fn resolve_mode(&self) -> Environment {
        let Some(raw) = self.env.var(MODE_ENV_VAR).filter(|v| !v.is_empty()) else {
            warn!(
                var = MODE_ENV_VAR,
                fallback = %Environment::Development,
                "Deployment mode not set, falling back to development"
            );
            return Environment::Development;
        };

        match raw.parse() {
            Ok(mode) => mode,
            Err(e) => {
                warn!(
                    var = MODE_ENV_VAR,
                    value = %raw,
                    error = %e,
                    fallback = %Environment::Development,
                    "Invalid deployment mode, falling back to development"
                );
                Environment::Development
            }
        }
    }
}

fn optional_layer(source: Source, path: PathBuf, config: &mut ThetaConfig) -> LayerReport {
    let outcome = match load_into(&path, config) {
        Ok(()) => {
            info!(file = %path.display(), source = %source, "Configuration layer applied");
            LayerOutcome::Applied
        }
        Err(e) if e.is_not_found() => {
            // A missing local file is the normal case.
            if source == Source::LocalFile {
                debug!(file = %path.display(), source = %source, "Optional configuration file not found");
            } else {
                warn!(file = %path.display(), source = %source, "Optional configuration file not found");
            }
            LayerOutcome::NotFound
        }
        Err(e) => {
            warn!(
                file = %path.display(),
                source = %source,
                error = %e,
                "Skipping configuration file that could not be loaded"
            );
            LayerOutcome::Skipped {
                reason: e.to_string(),
            }
        }
    };

    LayerReport {
        source,
        path,
        outcome,
    }
}
