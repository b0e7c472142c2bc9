//! Conversion of raw override strings into typed field values.

use std::fmt;
use std::num::ParseIntError;

use thiserror::Error;

/// Semantic kind of a scalar configuration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Free-form text.
    Text,
    /// `true` / `false`, or one of their short spellings.
    Boolean,
    /// Base-10 integer.
    Integer,
}

impl FieldKind {
    /// Lowercase name used in log fields and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed value ready to be written into a field slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Text value.
    Text(String),
    /// Boolean value.
    Boolean(bool),
    /// Integer value, range-checked against the slot on assignment.
    Integer(i64),
}

impl FieldValue {
    /// Kind of this value.
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Text(_) => FieldKind::Text,
            Self::Boolean(_) => FieldKind::Boolean,
            Self::Integer(_) => FieldKind::Integer,
        }
    }
}

/// Reasons a raw value cannot be converted for a field.
///
/// Messages never echo the raw input so they are safe to log for
/// sensitive fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoerceError {
    /// The input is not a recognized boolean spelling.
    #[error("expected a boolean (1, t, T, TRUE, true, True, 0, f, F, FALSE, false, False)")]
    InvalidBoolean,

    /// The input is not a base-10 integer.
    #[error("expected a base-10 integer: {0}")]
    InvalidInteger(#[from] ParseIntError),

    /// The integer does not fit the field's type.
    #[error("integer out of range, expected {min}..={max}")]
    OutOfRange {
        /// Smallest accepted value.
        min: i128,
        /// Largest accepted value.
        max: i128,
    },

    /// The value's kind does not match the field's kind.
    #[error("expected a {expected} value, found {found}")]
    KindMismatch {
        /// Kind the field declares.
        expected: FieldKind,
        /// Kind that was supplied.
        found: FieldKind,
    },
}

/// Convert `raw` into a value of the given kind.
///
/// # Example
///
/// ```
/// use theta_config::{coerce, FieldKind, FieldValue};
///
/// assert_eq!(coerce("True", FieldKind::Boolean), Ok(FieldValue::Boolean(true)));
/// assert!(coerce("on", FieldKind::Boolean).is_err());
/// assert_eq!(coerce(" 9090 ", FieldKind::Integer), Ok(FieldValue::Integer(9090)));
/// assert!(coerce("not-a-number", FieldKind::Integer).is_err());
/// ```
pub fn coerce(raw: &str, kind: FieldKind) -> Result<FieldValue, CoerceError> {
    match kind {
        FieldKind::Text => Ok(FieldValue::Text(raw.to_string())),
        FieldKind::Boolean => parse_bool(raw)
            .map(FieldValue::Boolean)
            .ok_or(CoerceError::InvalidBoolean),
        FieldKind::Integer => Ok(FieldValue::Integer(raw.trim().parse::<i64>()?)),
    }
}

/// Parse a boolean from a string.
///
/// Only the exact spellings below are accepted; no trimming, no other case
/// variants.
fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
