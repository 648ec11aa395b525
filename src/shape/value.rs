//! Typed field values for schema-driven shapes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::shape::Shape;

/// A single typed field value inside a [`Shape`].
///
/// Each variant corresponds to one of the semantic types the wire
/// serializers understand. Enum values carry their wire string name, not an
/// ordinal, so serialization never depends on declaration order.
///
/// `From` conversions are provided for the common Rust types so fields can
/// be set without naming the variant:
///
/// ```rust
/// use nimbus_sdk_core::shape::Shape;
///
/// let shape = Shape::new()
///     .with("QueueName", "jobs")
///     .with("DelaySeconds", 30_i64)
///     .with("Durable", true);
///
/// assert_eq!(shape.str_field("QueueName"), "jobs");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    /// A UTF-8 string.
    Str(String),
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit float.
    Float(f64),
    /// A boolean.
    Bool(bool),
    /// A UTC timestamp.
    Timestamp(DateTime<Utc>),
    /// An enum value, carried as its wire string name.
    Enum(String),
    /// A nested shape.
    Shape(Shape),
    /// A homogeneous list of values.
    List(Vec<FieldValue>),
    /// A string-keyed map of values.
    Map(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    /// Returns a short name for the variant, used in error messages.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Bool(_) => "boolean",
            Self::Timestamp(_) => "timestamp",
            Self::Enum(_) => "enum",
            Self::Shape(_) => "shape",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }

    /// Returns the string value for `Str` and `Enum` variants.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) | Self::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer value, if this is an `Int`.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the float value, if this is a `Float`.
    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the boolean value, if this is a `Bool`.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the timestamp value, if this is a `Timestamp`.
    #[must_use]
    pub const fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Returns the nested shape, if this is a `Shape`.
    #[must_use]
    pub const fn as_shape(&self) -> Option<&Shape> {
        match self {
            Self::Shape(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the list items, if this is a `List`.
    #[must_use]
    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the map entries, if this is a `Map`.
    #[must_use]
    pub const fn as_map(&self) -> Option<&BTreeMap<String, FieldValue>> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Returns the scalar rendered as a plain string, the way query-string
    /// and header bindings emit it. Returns `None` for container variants.
    #[must_use]
    pub fn to_wire_string(&self) -> Option<String> {
        match self {
            Self::Str(s) | Self::Enum(s) => Some(s.clone()),
            Self::Int(n) => Some(n.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Timestamp(t) => Some(t.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)),
            Self::Shape(_) | Self::List(_) | Self::Map(_) => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl From<Shape> for FieldValue {
    fn from(value: Shape) -> Self {
        Self::Shape(value)
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(value: Vec<FieldValue>) -> Self {
        Self::List(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value.into_iter().map(FieldValue::Str).collect())
    }
}

impl From<BTreeMap<String, FieldValue>> for FieldValue {
    fn from(value: BTreeMap<String, FieldValue>) -> Self {
        Self::Map(value)
    }
}
