//! Structured (JSON) file loading with key-presence merge semantics.
//!
//! A document is parsed into a [`serde_json::Value`] first and then applied
//! through the section schema: keys present in the document overwrite the
//! matching field, absent keys (and `null`) leave the field as it was. This is
//! what lets the base, mode and local files layer on top of each other.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, info_span, trace, warn};

use crate::binding::{join_path, FieldBinding, FieldSlot, FieldVisitor, Section};
use crate::coerce::{FieldKind, FieldValue};
use crate::ConfigError;

/// Load a JSON file and merge it onto `target`.
///
/// The merge is staged on a copy of `target` and committed only if the whole
/// document applies cleanly, so a rejected file never leaves a half-merged
/// configuration behind.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - The file does not exist (`FileNotFound`)
/// - The file cannot be read (`PermissionDenied` or `ReadError`)
/// - The file is not valid JSON (`ParseError`)
/// - The top level is not an object (`InvalidDocument`)
/// - A key holds a value of the wrong type or range (`InvalidValue`)
///
/// # Example
///
/// ```no_run
/// use theta_config::{load_into, ThetaConfig};
///
/// # fn main() -> Result<(), theta_config::ConfigError> {
/// let mut config = ThetaConfig::default();
/// load_into("configs/config.json", &mut config)?;
/// # Ok(())
/// # }
/// ```
pub fn load_into<S>(path: impl AsRef<Path>, target: &mut S) -> Result<(), ConfigError>
where
    S: Section + Clone,
{
    let path = path.as_ref();
    let _span = info_span!("config_file", file = %path.display()).entered();

    debug!("Loading configuration from JSON file");
    match path.try_exists() {
        Ok(true) => {}
        Ok(false) => return Err(ConfigError::file_not_found(path)),
        Err(e) => return Err(ConfigError::from_io(path, e)),
    }

    let content = fs::read_to_string(path).map_err(|e| ConfigError::from_io(path, e))?;
    debug!(bytes = content.len(), "Configuration file read");

    let document: Value =
        serde_json::from_str(&content).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;

    let document = match document {
        Value::Object(map) => map,
        other => {
            return Err(ConfigError::InvalidDocument {
                path: path.to_path_buf(),
                found: json_type(&other),
            })
        }
    };

    merge_document(&document, target)?;
    debug!("Configuration file merged");
    Ok(())
}

/// Merge an already-parsed JSON object onto `target`.
///
/// Unrecognized keys are ignored with a warning.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if a key holds a value of the wrong
/// type or range; `target` is unchanged in that case.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use theta_config::{merge_document, ThetaConfig};
///
/// let mut config = ThetaConfig::default();
/// let doc = json!({"server": {"port": 9000}});
/// merge_document(doc.as_object().unwrap(), &mut config).unwrap();
///
/// assert_eq!(config.server.port, 9000);
/// assert_eq!(config.server.host, "localhost");
/// ```
pub fn merge_document<S>(document: &Map<String, Value>, target: &mut S) -> Result<(), ConfigError>
where
    S: Section + Clone,
{
    let mut staged = target.clone();
    let mut merge = DocumentMerge::new(document, String::new());
    staged.walk(&mut merge);
    merge.finish()?;
    *target = staged;
    Ok(())
}

/// Visitor that copies present document keys into the walked fields.
struct DocumentMerge<'d> {
    document: &'d Map<String, Value>,
    prefix: String,
    known: Vec<&'static str>,
    error: Option<ConfigError>,
}

impl<'d> DocumentMerge<'d> {
    fn new(document: &'d Map<String, Value>, prefix: String) -> Self {
        Self {
            document,
            prefix,
            known: Vec::new(),
            error: None,
        }
    }

    // Report unknown keys at this level and surface the first error.
    fn finish(self) -> Result<(), ConfigError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        for key in self.document.keys() {
            if !self.known.contains(&key.as_str()) {
                warn!(
                    key = %join_path(&self.prefix, key),
                    "Unrecognized configuration key ignored"
                );
            }
        }
        Ok(())
    }

    // Present, non-null value for `key`.
    fn lookup(&self, key: &str) -> Option<&'d Value> {
        self.document.get(key).filter(|value| !value.is_null())
    }
}

impl FieldVisitor for DocumentMerge<'_> {
    fn field(&mut self, binding: &FieldBinding, slot: FieldSlot<'_>) {
        self.known.push(binding.key);
        if self.error.is_some() {
            return;
        }
        let Some(value) = self.lookup(binding.key) else {
            return;
        };

        let path = join_path(&self.prefix, binding.key);
        let applied = typed_value(value, slot.kind())
            .and_then(|typed| slot.assign(typed).map_err(|e| e.to_string()));
        match applied {
            Ok(()) => trace!(field = %path, "Field set from document"),
            Err(reason) => self.error = Some(ConfigError::invalid_value(path, reason)),
        }
    }

    fn section(&mut self, key: &'static str, section: &mut dyn Section) {
        self.known.push(key);
        if self.error.is_some() {
            return;
        }
        let path = join_path(&self.prefix, key);
        match self.lookup(key) {
            None => {}
            Some(Value::Object(map)) => {
                let mut child = DocumentMerge::new(map, path);
                section.walk(&mut child);
                if let Err(error) = child.finish() {
                    self.error = Some(error);
                }
            }
            Some(other) => {
                self.error = Some(ConfigError::invalid_value(
                    path,
                    format!("expected an object, found {}", json_type(other)),
                ));
            }
        }
    }
}

// Convert a JSON value to the field's kind without any string coercion.
fn typed_value(value: &Value, kind: FieldKind) -> Result<FieldValue, String> {
    match (kind, value) {
        (FieldKind::Text, Value::String(s)) => Ok(FieldValue::Text(s.clone())),
        (FieldKind::Boolean, Value::Bool(b)) => Ok(FieldValue::Boolean(*b)),
        (FieldKind::Integer, Value::Number(n)) => n
            .as_i64()
            .map(FieldValue::Integer)
            .ok_or_else(|| "expected an integer, found a non-integer number".to_string()),
        (kind, other) => Err(format!("expected {kind} value, found {}", json_type(other))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
