//! Query-string serialization for shapes.
//!
//! Two uses share this module: operations that bind individual fields to
//! URI query parameters, and query-protocol operations whose whole body is a
//! flattened, form-encoded set of pairs.
//!
//! Container fields flatten with dotted indices, one-based:
//!
//! - list: `Subscribers.1`, `Subscribers.2`, ...
//! - map: `Tags.1.key`, `Tags.1.value`, `Tags.2.key`, ...
//! - nested shape: `Attributes.VisibilityTimeout`, ...
//!
//! Pair order follows the schema walk and index order, so repeated
//! serialization of the same shape is byte-identical after encoding.

use crate::shape::{FieldBinding, FieldKind, FieldValue, Shape, ShapeSchema};
use crate::wire::WireError;

/// Serializes query-bound fields into ordered `(name, value)` pairs.
///
/// # Errors
///
/// Returns [`WireError::TypeMismatch`] if a value cannot be flattened (for
/// example a list nested directly inside a list).
pub fn serialize_query_pairs(
    shape: &Shape,
    schema: &ShapeSchema,
) -> Result<Vec<(String, String)>, WireError> {
    serialize_binding(shape, schema, Some(FieldBinding::Query))
}

/// Serializes body-bound fields into ordered pairs for the query protocol.
///
/// # Errors
///
/// Returns [`WireError::TypeMismatch`] if a value cannot be flattened.
pub fn serialize_form_pairs(
    shape: &Shape,
    schema: &ShapeSchema,
) -> Result<Vec<(String, String)>, WireError> {
    serialize_binding(shape, schema, Some(FieldBinding::Body))
}

/// Percent-encodes pairs into a `k=v&k=v` string.
#[must_use]
pub fn encode_pairs(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn serialize_binding(
    shape: &Shape,
    schema: &ShapeSchema,
    binding: Option<FieldBinding>,
) -> Result<Vec<(String, String)>, WireError> {
    let mut pairs = Vec::new();
    for field in schema.fields {
        if binding.is_some_and(|b| field.binding != b) {
            continue;
        }
        let Some(value) = shape.get(field.name) else {
            continue;
        };
        flatten_value(field.wire_name, value, &field.kind, field.name, &mut pairs)?;
    }
    Ok(pairs)
}

fn flatten_value(
    prefix: &str,
    value: &FieldValue,
    kind: &FieldKind,
    field_name: &str,
    pairs: &mut Vec<(String, String)>,
) -> Result<(), WireError> {
    if let Some(scalar) = value.to_wire_string() {
        pairs.push((prefix.to_string(), scalar));
        return Ok(());
    }

    match value {
        FieldValue::List(items) => {
            // Empty containers are omitted, matching the body serializers.
            for (index, item) in items.iter().enumerate() {
                let scalar = item.to_wire_string().ok_or_else(|| WireError::TypeMismatch {
                    field: field_name.to_string(),
                    expected: "scalar list element",
                    found: item.kind_name(),
                })?;
                pairs.push((format!("{}.{}", prefix, index + 1), scalar));
            }
            Ok(())
        }
        FieldValue::Map(entries) => {
            for (index, (key, entry)) in entries.iter().enumerate() {
                let scalar = entry.to_wire_string().ok_or_else(|| WireError::TypeMismatch {
                    field: field_name.to_string(),
                    expected: "scalar map value",
                    found: entry.kind_name(),
                })?;
                pairs.push((format!("{}.{}.key", prefix, index + 1), key.clone()));
                pairs.push((format!("{}.{}.value", prefix, index + 1), scalar));
            }
            Ok(())
        }
        FieldValue::Shape(nested) => {
            // Walk the nested schema so wire names and field order match the
            // body serializers.
            let FieldKind::Shape(nested_schema) = kind else {
                return Err(WireError::TypeMismatch {
                    field: field_name.to_string(),
                    expected: "value matching the declared field kind",
                    found: value.kind_name(),
                });
            };
            for nested_field in nested_schema.fields {
                let Some(entry) = nested.get(nested_field.name) else {
                    continue;
                };
                flatten_value(
                    &format!("{}.{}", prefix, nested_field.wire_name),
                    entry,
                    &nested_field.kind,
                    nested_field.name,
                    pairs,
                )?;
            }
            Ok(())
        }
        // Scalar variants were rendered by to_wire_string above.
        _ => Err(WireError::TypeMismatch {
            field: field_name.to_string(),
            expected: "flattenable value",
            found: value.kind_name(),
        }),
    }
}
