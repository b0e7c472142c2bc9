//! Environment-variable overrides, the highest-precedence layers.
//!
//! Every bound field is looked up first in the process environment, then in
//! the dotenv map. A found value is coerced to the field's kind; values that
//! do not convert are logged and skipped, never fatal.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::binding::{join_path, FieldBinding, FieldSlot, FieldVisitor, Section};
use crate::coerce::{coerce, CoerceError};
use crate::dotenv::DotenvMap;
use crate::schema::REDACTED;
use crate::Source;

/// Read access to environment variables.
///
/// The resolver reads the live process environment through [`ProcessEnv`];
/// tests and embedders can substitute any map.
pub trait EnvSource {
    /// Value of `key`, or `None` if it is not set.
    fn var(&self, key: &str) -> Option<String>;
}

/// The live process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        // Non-unicode values are treated as unset.
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// An override that was written into the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedOverride {
    /// Dotted path of the field.
    pub field: String,
    /// Environment variable that supplied the value.
    pub env: &'static str,
    /// Where the value was found.
    pub source: Source,
}

/// An override whose value could not be converted for its field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedOverride {
    /// Dotted path of the field.
    pub field: String,
    /// Environment variable that supplied the value.
    pub env: &'static str,
    /// Where the value was found.
    pub source: Source,
    /// Why the value was rejected.
    pub reason: CoerceError,
}

/// Outcome of an override pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideReport {
    /// Overrides that were applied, in schema order.
    pub applied: Vec<AppliedOverride>,
    /// Overrides that were skipped because their value did not convert.
    pub rejected: Vec<RejectedOverride>,
}

impl OverrideReport {
    /// Source that supplied `field`, if it was overridden.
    pub fn source_of(&self, field: &str) -> Option<Source> {
        self.applied
            .iter()
            .find(|o| o.field == field)
            .map(|o| o.source)
    }

    /// Whether every override found was applied.
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Apply environment overrides to every bound field of `target`.
///
/// Nested sections are always walked. For each field with an environment
/// binding, the process environment wins over the dotenv map; an empty value
/// counts as unset in both.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use theta_config::{apply_env_overrides, DotenvMap, Source, ThetaConfig};
///
/// let env = HashMap::from([("SERVER_PORT".to_string(), "9000".to_string())]);
/// let dotenv = DotenvMap::from([("SERVER_HOST".to_string(), "0.0.0.0".to_string())]);
///
/// let mut config = ThetaConfig::default();
/// let report = apply_env_overrides(&mut config, &env, &dotenv);
///
/// assert_eq!(config.server.port, 9000);
/// assert_eq!(config.server.host, "0.0.0.0");
/// assert_eq!(report.source_of("server.host"), Some(Source::DotenvFile));
/// ```
pub fn apply_env_overrides<S>(
    target: &mut S,
    env: &dyn EnvSource,
    dotenv: &DotenvMap,
) -> OverrideReport
where
    S: Section + ?Sized,
{
    debug!("Applying environment overrides");
    let mut overrides = EnvOverrides {
        env,
        dotenv,
        prefix: String::new(),
        report: OverrideReport::default(),
    };
    target.walk(&mut overrides);

    let report = overrides.report;
    debug!(
        applied = report.applied.len(),
        rejected = report.rejected.len(),
        "Environment overrides complete"
    );
    report
}

struct EnvOverrides<'a> {
    env: &'a dyn EnvSource,
    dotenv: &'a DotenvMap,
    prefix: String,
    report: OverrideReport,
}

impl EnvOverrides<'_> {
    fn lookup(&self, name: &str) -> Option<(String, Source)> {
        if let Some(value) = self.env.var(name).filter(|v| !v.is_empty()) {
            return Some((value, Source::ProcessEnvironment));
        }
        self.dotenv
            .get(name)
            .filter(|v| !v.is_empty())
            .map(|value| (value.clone(), Source::DotenvFile))
    }
}

impl FieldVisitor for EnvOverrides<'_> {
    fn field(&mut self, binding: &FieldBinding, slot: FieldSlot<'_>) {
        let Some(env) = binding.env else {
            return;
        };
        let field = join_path(&self.prefix, binding.key);

        let Some((raw, source)) = self.lookup(env) else {
            debug!(field = %field, env, "No override found for field");
            return;
        };
        let shown = if binding.sensitive { REDACTED } else { raw.as_str() };

        let kind = slot.kind();
        match coerce(&raw, kind).and_then(|value| slot.assign(value)) {
            Ok(()) => {
                info!(field = %field, env, source = %source, value = %shown, "Field overridden");
                self.report.applied.push(AppliedOverride { field, env, source });
            }
            Err(reason) => {
                warn!(
                    field = %field,
                    env,
                    source = %source,
                    kind = %kind,
                    value = %shown,
                    error = %reason,
                    "Ignoring override that cannot be converted, keeping previous value"
                );
                self.report.rejected.push(RejectedOverride {
                    field,
                    env,
                    source,
                    reason,
                });
            }
        }
    }

    fn section(&mut self, key: &'static str, section: &mut dyn Section) {
        let parent = std::mem::take(&mut self.prefix);
        self.prefix = join_path(&parent, key);
        section.walk(self);
        self.prefix = parent;
    }
}
