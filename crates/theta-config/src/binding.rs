//! Field-binding schema and the visitor used to walk it.
//!
//! Every configuration section implements [`Section`], presenting its fields
//! in declared order to a [`FieldVisitor`]. Scalar fields arrive as a
//! [`FieldBinding`] plus a mutable [`FieldSlot`]; nested sections arrive as
//! sections and are walked by the visitor itself. File merging, environment
//! overrides and binding introspection are all visitors over this one walk.

use crate::coerce::{CoerceError, FieldKind, FieldValue};

/// Static metadata attached to a scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldBinding {
    /// Key of the field in structured documents.
    pub key: &'static str,
    /// Environment variable that overrides the field, if any.
    pub env: Option<&'static str>,
    /// Whether the value must never appear in logs.
    pub sensitive: bool,
}

impl FieldBinding {
    /// Binding for a field that can be overridden by `env`.
    pub const fn new(key: &'static str, env: &'static str) -> Self {
        Self {
            key,
            env: Some(env),
            sensitive: false,
        }
    }

    /// Mark the field as holding a secret.
    #[must_use]
    pub const fn sensitive(self) -> Self {
        Self {
            sensitive: true,
            ..self
        }
    }
}

/// Mutable access to one scalar field, tagged with its storage type.
#[derive(Debug)]
pub enum FieldSlot<'a> {
    /// Text field.
    Text(&'a mut String),
    /// Boolean field.
    Boolean(&'a mut bool),
    /// 16-bit unsigned integer field (ports).
    U16(&'a mut u16),
    /// 64-bit unsigned integer field (durations in seconds).
    U64(&'a mut u64),
}

impl FieldSlot<'_> {
    /// Semantic kind the slot accepts.
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Text(_) => FieldKind::Text,
            Self::Boolean(_) => FieldKind::Boolean,
            Self::U16(_) | Self::U64(_) => FieldKind::Integer,
        }
    }

    /// Write `value` into the field.
    ///
    /// The field is left untouched when the value has the wrong kind or does
    /// not fit the storage type.
    pub fn assign(self, value: FieldValue) -> Result<(), CoerceError> {
        match (self, value) {
            (Self::Text(slot), FieldValue::Text(v)) => *slot = v,
            (Self::Boolean(slot), FieldValue::Boolean(v)) => *slot = v,
            (Self::U16(slot), FieldValue::Integer(v)) => {
                *slot = u16::try_from(v).map_err(|_| out_of_range(u16::MAX))?;
            }
            (Self::U64(slot), FieldValue::Integer(v)) => {
                *slot = u64::try_from(v).map_err(|_| out_of_range(u64::MAX))?;
            }
            (slot, value) => {
                return Err(CoerceError::KindMismatch {
                    expected: slot.kind(),
                    found: value.kind(),
                })
            }
        }
        Ok(())
    }
}

fn out_of_range(max: impl Into<i128>) -> CoerceError {
    CoerceError::OutOfRange {
        min: 0,
        max: max.into(),
    }
}

impl<'a> From<&'a mut String> for FieldSlot<'a> {
    fn from(slot: &'a mut String) -> Self {
        Self::Text(slot)
    }
}

impl<'a> From<&'a mut bool> for FieldSlot<'a> {
    fn from(slot: &'a mut bool) -> Self {
        Self::Boolean(slot)
    }
}

impl<'a> From<&'a mut u16> for FieldSlot<'a> {
    fn from(slot: &'a mut u16) -> Self {
        Self::U16(slot)
    }
}

impl<'a> From<&'a mut u64> for FieldSlot<'a> {
    fn from(slot: &'a mut u64) -> Self {
        Self::U64(slot)
    }
}

/// Receives the fields of a [`Section`] during a walk.
pub trait FieldVisitor {
    /// Called for every scalar field, bound or not.
    fn field(&mut self, binding: &FieldBinding, slot: FieldSlot<'_>);

    /// Called for every nested section stored under `key`.
    ///
    /// Implementations are expected to walk into `section`.
    fn section(&mut self, key: &'static str, section: &mut dyn Section);
}

/// A configuration section whose fields can be walked generically.
pub trait Section {
    /// Present every field, in declared order, to `visitor`.
    fn walk(&mut self, visitor: &mut dyn FieldVisitor);
}

/// Join a dotted field path.
pub(crate) fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}
