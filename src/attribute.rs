//! Tunable attributes and the coercion of textual input into them.
//!
//! The presentation layer edits attributes as text. Each attribute declares a kind, and incoming
//! text is coerced to that kind before it reaches a component:
//!
//! - [`Integer`](AttributeKind::Integer): the trimmed text must parse as an integer, and tunables
//!   must be positive. Out-of-domain values are rejected, never clamped.
//! - [`Boolean`](AttributeKind::Boolean): only the exact token `"True"` is true. Anything else is
//!   false, so boolean coercion never fails.

use std::fmt::{self, Display};

use crate::error::{SimError, SimResult};

pub(crate) const ACTIVE: &str = "active";
pub(crate) const RATE: &str = "rate";
pub(crate) const MULTIPLIER: &str = "multiplier";
pub(crate) const THREAD_COUNT: &str = "thread_count";
pub(crate) const LATENCY_MS: &str = "latency_ms";

/// The declared type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    /// A positive integer.
    Integer,
    /// A flag.
    Boolean,
}

/// A typed attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeValue {
    /// An integer value.
    Integer(u64),
    /// A boolean value.
    Boolean(bool),
}

/// An attribute as listed by a component: its name, kind and current value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// The attribute name, used to get and set it.
    pub name: &'static str,
    /// The declared kind.
    pub kind: AttributeKind,
    /// The value at the time it was listed.
    pub value: AttributeValue,
}

impl Attribute {
    pub(crate) fn integer(name: &'static str, value: u64) -> Self {
        Self {
            name,
            kind: AttributeKind::Integer,
            value: AttributeValue::Integer(value),
        }
    }

    pub(crate) fn boolean(name: &'static str, value: bool) -> Self {
        Self {
            name,
            kind: AttributeKind::Boolean,
            value: AttributeValue::Boolean(value),
        }
    }
}

impl AttributeKind {
    /// Coerce raw text into a value of this kind, for the attribute `name`.
    pub fn coerce(self, name: &str, raw: &str) -> SimResult<AttributeValue> {
        match self {
            AttributeKind::Boolean => Ok(AttributeValue::Boolean(raw == "True")),
            AttributeKind::Integer => {
                let parsed: i64 = raw.trim().parse().map_err(|_| SimError::TypeCoercionFailure {
                    attribute: name.to_string(),
                    value: raw.to_string(),
                    expected: self,
                })?;
                Ok(AttributeValue::Integer(positive(name, parsed)?))
            }
        }
    }
}

impl AttributeValue {
    /// The integer inside, if this is an integer value.
    pub fn as_integer(self) -> Option<u64> {
        match self {
            AttributeValue::Integer(value) => Some(value),
            AttributeValue::Boolean(_) => None,
        }
    }

    /// The flag inside, if this is a boolean value.
    pub fn as_boolean(self) -> Option<bool> {
        match self {
            AttributeValue::Boolean(value) => Some(value),
            AttributeValue::Integer(_) => None,
        }
    }
}

/// Reject tunables that must be positive.
pub(crate) fn positive(name: &str, value: i64) -> SimResult<u64> {
    if value <= 0 {
        return Err(SimError::invalid(name, format!("must be positive, got {value}")));
    }
    Ok(value as u64)
}

/// Reject unsigned tunables that must be positive.
pub(crate) fn non_zero(name: &str, value: u64) -> SimResult<u64> {
    if value == 0 {
        return Err(SimError::invalid(name, "must be positive, got 0"));
    }
    Ok(value)
}

impl Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AttributeKind::Integer => "a positive integer",
            AttributeKind::Boolean => "a boolean",
        })
    }
}

impl Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Integer(value) => write!(f, "{value}"),
            // Matches the only token accepted as true.
            AttributeValue::Boolean(true) => f.write_str("True"),
            AttributeValue::Boolean(false) => f.write_str("False"),
        }
    }
}
