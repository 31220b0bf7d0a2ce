//! Typed attribute values.

use super::EntityReference;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A single attribute value held by a [`Record`](super::Record).
///
/// `Cleared` is the explicit "set to nothing" marker carried by change
/// payloads. A cleared attribute is still present on the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    /// Free text.
    Text(String),
    /// Whole number.
    Integer(i64),
    /// Floating point number.
    Number(f64),
    /// Boolean flag.
    Boolean(bool),
    /// Unique identifier.
    Identifier(Uuid),
    /// Point in time, UTC.
    Timestamp(DateTime<Utc>),
    /// Lookup to another record.
    Reference(EntityReference),
    /// Explicitly cleared value.
    Cleared,
}

impl AttributeValue {
    /// Returns the text, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer, if this is an integer value.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the number, widening integers.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Returns the flag, if this is a boolean value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the identifier, if this is an identifier value.
    #[must_use]
    pub fn as_identifier(&self) -> Option<Uuid> {
        match self {
            Self::Identifier(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the timestamp, if this is a timestamp value.
    #[must_use]
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the reference, if this is a lookup value.
    #[must_use]
    pub fn as_reference(&self) -> Option<&EntityReference> {
        match self {
            Self::Reference(r) => Some(r),
            _ => None,
        }
    }

    /// Returns true for the cleared marker.
    #[must_use]
    pub fn is_cleared(&self) -> bool {
        matches!(self, Self::Cleared)
    }

    /// Name of the value kind, for diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Integer(_) => "integer",
            Self::Number(_) => "number",
            Self::Boolean(_) => "boolean",
            Self::Identifier(_) => "identifier",
            Self::Timestamp(_) => "timestamp",
            Self::Reference(_) => "reference",
            Self::Cleared => "cleared",
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Number(v) => write!(f, "{v}"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Identifier(v) => write!(f, "{v}"),
            Self::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
            Self::Reference(r) => write!(f, "{r}"),
            Self::Cleared => write!(f, "<cleared>"),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<Uuid> for AttributeValue {
    fn from(value: Uuid) -> Self {
        Self::Identifier(value)
    }
}

impl From<DateTime<Utc>> for AttributeValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl From<EntityReference> for AttributeValue {
    fn from(value: EntityReference) -> Self {
        Self::Reference(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_match_kind() {
        assert_eq!(AttributeValue::from("Auckland").as_text(), Some("Auckland"));
        assert_eq!(AttributeValue::from(30_i64).as_integer(), Some(30));
        assert_eq!(AttributeValue::from(30_i64).as_number(), Some(30.0));
        assert_eq!(AttributeValue::from(true).as_bool(), Some(true));
        assert!(AttributeValue::from(1.5).as_text().is_none());
        assert!(AttributeValue::Cleared.is_cleared());
    }

    #[test]
    fn test_reference_value() {
        let reference = EntityReference::new("contact", Uuid::new_v4());
        let value = AttributeValue::from(reference.clone());
        assert_eq!(value.as_reference(), Some(&reference));
        assert_eq!(value.kind(), "reference");
    }

    #[test]
    fn test_value_serialization_is_tagged() {
        let json = serde_json::to_value(AttributeValue::from("x")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "text", "value": "x"}));

        let cleared = serde_json::to_value(AttributeValue::Cleared).unwrap();
        assert_eq!(cleared, serde_json::json!({"type": "cleared"}));
    }
}
