//! Const-constructible wire schemas for shapes.
//!
//! A [`ShapeSchema`] describes how the fields of a [`Shape`](crate::shape::Shape)
//! appear on the wire: their wire names, semantic kinds, and which part of
//! the HTTP request each field binds to. Schemas are `'static` tables, so a
//! generated service crate defines them as constants next to its operations.
//!
//! # Example
//!
//! ```rust
//! use nimbus_sdk_core::shape::{FieldBinding, FieldKind, FieldSchema, ShapeSchema};
//!
//! const CREATE_QUEUE_INPUT: ShapeSchema = ShapeSchema::new(
//!     "CreateQueueInput",
//!     &[
//!         FieldSchema::new("QueueName", "QueueName", FieldKind::Str, FieldBinding::Uri),
//!         FieldSchema::new("DelaySeconds", "DelaySeconds", FieldKind::Int, FieldBinding::Body),
//!         FieldSchema::new("Tags", "Tags", FieldKind::Map(&FieldKind::Str), FieldBinding::Body),
//!     ],
//! );
//!
//! assert!(CREATE_QUEUE_INPUT.field("DelaySeconds").is_some());
//! ```

/// The semantic kind of a field.
///
/// Container kinds reference their element kind through `'static` borrows so
/// the whole schema stays const-constructible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A UTF-8 string.
    Str,
    /// A 64-bit signed integer.
    Int,
    /// A 64-bit float.
    Float,
    /// A boolean.
    Bool,
    /// A UTC timestamp, serialized as RFC 3339.
    Timestamp,
    /// An enum, serialized as its wire string name.
    Enum,
    /// A nested shape with its own schema.
    Shape(&'static ShapeSchema),
    /// A list of elements of the given kind.
    List(&'static FieldKind),
    /// A string-keyed map of values of the given kind.
    Map(&'static FieldKind),
}

/// Which part of the HTTP request a field binds to.
///
/// The binding is fixed per operation by the schema, never selected at
/// runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldBinding {
    /// Serialized into the request body (JSON or XML per the operation's
    /// wire protocol).
    Body,
    /// Emitted as a URI query-string parameter.
    Query,
    /// Emitted as an HTTP header.
    Header,
    /// Interpolated into the URI path template (and host prefix, if the
    /// operation declares one).
    Uri,
}

/// Schema for a single field of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSchema {
    /// The field name used by [`Shape`](crate::shape::Shape) accessors.
    pub name: &'static str,
    /// The name the field carries on the wire (JSON key, XML element,
    /// query parameter, or header name).
    pub wire_name: &'static str,
    /// The semantic kind of the field.
    pub kind: FieldKind,
    /// Which part of the request the field binds to.
    pub binding: FieldBinding,
}

impl FieldSchema {
    /// Creates a new field schema.
    ///
    /// This is a `const fn` so schemas can be defined as constants.
    #[must_use]
    pub const fn new(
        name: &'static str,
        wire_name: &'static str,
        kind: FieldKind,
        binding: FieldBinding,
    ) -> Self {
        Self {
            name,
            wire_name,
            kind,
            binding,
        }
    }
}

/// Schema for a complete shape.
///
/// Field order in `fields` is the wire emission order: serializers walk this
/// slice front to back, which is what makes repeated serialization of the
/// same shape byte-identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeSchema {
    /// The shape name; doubles as the XML root element name.
    pub name: &'static str,
    /// The fields in wire emission order.
    pub fields: &'static [FieldSchema],
}

impl ShapeSchema {
    /// Creates a new shape schema.
    #[must_use]
    pub const fn new(name: &'static str, fields: &'static [FieldSchema]) -> Self {
        Self { name, fields }
    }

    /// Looks up a field by its shape-level name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Looks up a field by its wire name.
    ///
    /// Used by deserializers mapping document keys back to fields.
    #[must_use]
    pub fn field_by_wire_name(&self, wire_name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.wire_name == wire_name)
    }

    /// Returns the fields with the given binding, in schema order.
    pub fn fields_with_binding(
        &self,
        binding: FieldBinding,
    ) -> impl Iterator<Item = &FieldSchema> {
        self.fields.iter().filter(move |f| f.binding == binding)
    }
}

// Verify schema types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ShapeSchema>();
    assert_send_sync::<FieldSchema>();
};
