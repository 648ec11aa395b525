//! Wire serialization and deserialization for shapes.
//!
//! Serializers walk a shape's schema in declared field order and emit only
//! the fields that have been set, which makes repeated serialization of the
//! same shape byte-identical. Deserializers do the reverse walk: they set
//! only the fields present in the wire document, ignore unknown keys for
//! forward compatibility, and leave everything else unset.
//!
//! Three body encodings are supported, selected per operation by
//! [`WireProtocol`]:
//!
//! - [`json`]: JSON document bodies
//! - [`xml`]: XML document bodies
//! - [`query`]: flattened query-string / form pairs
//!
//! Header-bound fields are handled here directly since they are plain
//! key/value pairs regardless of protocol.

pub mod json;
pub mod query;
pub mod xml;

use thiserror::Error;

use crate::shape::{FieldBinding, Shape, ShapeSchema};

/// The body encoding an operation uses on the wire.
///
/// Fixed per operation by its schema, never selected at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireProtocol {
    /// JSON request and response bodies.
    Json,
    /// XML request and response bodies.
    Xml,
    /// Form-encoded request pairs with XML responses (query protocol).
    Query,
}

impl WireProtocol {
    /// Returns the request content type for this protocol.
    #[must_use]
    pub const fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Xml => "application/xml",
            Self::Query => "application/x-www-form-urlencoded",
        }
    }
}

/// Errors produced while serializing or deserializing a shape.
///
/// Serialization failures are rare in practice; they come from hand-built
/// shapes whose values contradict the schema (for example a string set where
/// the schema declares an integer).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WireError {
    /// A field value does not match the kind its schema declares.
    #[error("Field '{field}' expected {expected} but found {found}.")]
    TypeMismatch {
        /// The shape-level field name.
        field: String,
        /// The kind the schema declares.
        expected: &'static str,
        /// The kind actually present.
        found: &'static str,
    },

    /// A numeric value cannot be represented on the wire.
    #[error("Field '{field}' holds a value that cannot be represented: {message}")]
    UnrepresentableValue {
        /// The shape-level field name.
        field: String,
        /// Why the value cannot be emitted.
        message: String,
    },

    /// The wire document could not be parsed.
    #[error("Malformed {protocol} document: {message}")]
    MalformedDocument {
        /// The protocol whose parser failed.
        protocol: &'static str,
        /// Parser diagnostic.
        message: String,
    },
}

/// Serializes header-bound fields into `(header name, value)` pairs.
///
/// Only scalar kinds are meaningful in headers; container values produce a
/// [`WireError::TypeMismatch`]. Unset fields are omitted.
///
/// # Errors
///
/// Returns [`WireError::TypeMismatch`] if a header-bound field holds a
/// container value.
pub fn serialize_headers(
    shape: &Shape,
    schema: &ShapeSchema,
) -> Result<Vec<(String, String)>, WireError> {
    let mut headers = Vec::new();
    for field in schema.fields_with_binding(FieldBinding::Header) {
        let Some(value) = shape.get(field.name) else {
            continue;
        };
        let rendered = value.to_wire_string().ok_or_else(|| WireError::TypeMismatch {
            field: field.name.to_string(),
            expected: "scalar",
            found: value.kind_name(),
        })?;
        headers.push((field.wire_name.to_string(), rendered));
    }
    Ok(headers)
}
