//! Schema-driven shapes with sparse field tracking.
//!
//! A [`Shape`] is the generic data holder behind every API request and
//! response: a collection of named, typed fields. Instead of one generated
//! struct per API shape, the runtime uses this single representation plus a
//! [`ShapeSchema`] describing wire names and bindings.
//!
//! # Sparse semantics
//!
//! A field is considered *set* only after [`Shape::set`] (or [`Shape::with`])
//! has been called for it — including when the value equals the semantic zero
//! value. Serializers emit a field if and only if it has been set, which is
//! what gives partial updates and idempotent retries their meaning upstream.
//!
//! Setting a field performs no validation. Required-field and range
//! constraints are the server's to enforce; an invalid shape is constructible
//! and simply comes back as a service error.
//!
//! # Example
//!
//! ```rust
//! use nimbus_sdk_core::shape::Shape;
//!
//! let mut shape = Shape::new();
//! assert!(!shape.has_been_set("DelaySeconds"));
//! assert_eq!(shape.int_field("DelaySeconds"), 0); // zero value, not set
//!
//! shape.set("DelaySeconds", 0_i64);
//! assert!(shape.has_been_set("DelaySeconds")); // set, even to the zero value
//! ```

mod schema;
mod value;

pub use schema::{FieldBinding, FieldKind, FieldSchema, ShapeSchema};
pub use value::FieldValue;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

static EMPTY_LIST: [FieldValue; 0] = [];
static EMPTY_MAP: BTreeMap<String, FieldValue> = BTreeMap::new();
static EMPTY_SHAPE: Shape = Shape {
    fields: BTreeMap::new(),
};

/// A collection of named, typed fields with has-been-set tracking.
///
/// Presence in the internal map *is* the has-been-set flag; unset fields are
/// simply absent. Typed accessors return the semantic zero value for unset
/// fields, so callers never need to unwrap for the common read path.
///
/// Shapes are plain values: `Clone` covers the polymorphic-copy needs of
/// async dispatch, they hold no resources, and they carry no background
/// state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Shape {
    fields: BTreeMap<String, FieldValue>,
}

impl Shape {
    /// Creates an empty shape with no fields set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    /// Sets a field value and marks it as set.
    ///
    /// No validation is performed; any value is accepted for any name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Fluent variant of [`set`](Self::set) for chained construction.
    ///
    /// ```rust
    /// use nimbus_sdk_core::shape::Shape;
    ///
    /// let shape = Shape::new()
    ///     .with("QueueName", "jobs")
    ///     .with("Durable", true);
    /// assert!(shape.has_been_set("Durable"));
    /// ```
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Clears a field, returning it to the unset state.
    pub fn unset(&mut self, name: &str) {
        self.fields.remove(name);
    }

    /// Returns `true` if the field has been set at least once.
    #[must_use]
    pub fn has_been_set(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Returns the raw field value, if set.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Returns the string value of a field, or `""` if unset.
    #[must_use]
    pub fn str_field(&self, name: &str) -> &str {
        self.get(name).and_then(FieldValue::as_str).unwrap_or("")
    }

    /// Returns the integer value of a field, or `0` if unset.
    #[must_use]
    pub fn int_field(&self, name: &str) -> i64 {
        self.get(name).and_then(FieldValue::as_int).unwrap_or(0)
    }

    /// Returns the float value of a field, or `0.0` if unset.
    #[must_use]
    pub fn float_field(&self, name: &str) -> f64 {
        self.get(name).and_then(FieldValue::as_float).unwrap_or(0.0)
    }

    /// Returns the boolean value of a field, or `false` if unset.
    #[must_use]
    pub fn bool_field(&self, name: &str) -> bool {
        self.get(name).and_then(FieldValue::as_bool).unwrap_or(false)
    }

    /// Returns the timestamp value of a field, or the Unix epoch if unset.
    #[must_use]
    pub fn timestamp_field(&self, name: &str) -> DateTime<Utc> {
        self.get(name)
            .and_then(FieldValue::as_timestamp)
            .unwrap_or(DateTime::UNIX_EPOCH)
    }

    /// Returns the nested shape of a field, or an empty shape if unset.
    #[must_use]
    pub fn shape_field(&self, name: &str) -> &Self {
        self.get(name)
            .and_then(FieldValue::as_shape)
            .unwrap_or(&EMPTY_SHAPE)
    }

    /// Returns the list items of a field, or an empty slice if unset.
    #[must_use]
    pub fn list_field(&self, name: &str) -> &[FieldValue] {
        self.get(name)
            .and_then(FieldValue::as_list)
            .unwrap_or(&EMPTY_LIST)
    }

    /// Returns the map entries of a field, or an empty map if unset.
    #[must_use]
    pub fn map_field(&self, name: &str) -> &BTreeMap<String, FieldValue> {
        self.get(name)
            .and_then(FieldValue::as_map)
            .unwrap_or(&EMPTY_MAP)
    }

    /// Returns `true` if no fields have been set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the number of set fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Iterates over the set fields and their values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

// Verify Shape is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Shape>();
};
