//! JSON body serialization and deserialization.
//!
//! Emission walks the schema in declared order and keeps that order in the
//! output document (`serde_json` with `preserve_order`), so serializing the
//! same shape twice yields byte-identical text. Empty lists and maps are
//! omitted rather than emitted as empty containers.

use serde_json::{Map, Value};

use crate::shape::{FieldBinding, FieldKind, FieldValue, Shape, ShapeSchema};
use crate::wire::WireError;

/// Serializes the body-bound fields of a shape into a JSON document string.
///
/// Returns `None` when no body-bound field has been set, so callers can skip
/// attaching a body entirely.
///
/// # Errors
///
/// Returns [`WireError`] if a set value contradicts its schema kind or a
/// float is not a finite number.
pub fn serialize_body(shape: &Shape, schema: &ShapeSchema) -> Result<Option<String>, WireError> {
    let object = serialize_fields(shape, schema, true)?;
    if object.is_empty() {
        return Ok(None);
    }
    let text = serde_json::to_string(&Value::Object(object)).map_err(|e| {
        WireError::MalformedDocument {
            protocol: "JSON",
            message: e.to_string(),
        }
    })?;
    Ok(Some(text))
}

/// Deserializes a parsed JSON document into a shape.
///
/// Only fields present in the document are set; unknown keys are ignored for
/// forward compatibility, and `null` values leave the field unset.
///
/// # Errors
///
/// Returns [`WireError::TypeMismatch`] if a present value cannot be read as
/// the kind its schema declares.
pub fn deserialize_body(document: &Value, schema: &ShapeSchema) -> Result<Shape, WireError> {
    let mut shape = Shape::new();
    let Some(object) = document.as_object() else {
        return Ok(shape);
    };

    for (key, value) in object {
        let Some(field) = schema.field_by_wire_name(key) else {
            continue; // unknown field, tolerate for forward compatibility
        };
        if value.is_null() {
            continue;
        }
        let parsed = value_from_json(value, &field.kind, field.name)?;
        shape.set(field.name, parsed);
    }
    Ok(shape)
}

/// Serializes a whole document body for an error-free shape, walking every
/// body-bound field (or every field for nested shapes).
fn serialize_fields(
    shape: &Shape,
    schema: &ShapeSchema,
    body_only: bool,
) -> Result<Map<String, Value>, WireError> {
    let mut object = Map::new();
    for field in schema.fields {
        if body_only && field.binding != FieldBinding::Body {
            continue;
        }
        let Some(value) = shape.get(field.name) else {
            continue;
        };
        if is_empty_container(value) {
            continue;
        }
        object.insert(
            field.wire_name.to_string(),
            value_to_json(value, &field.kind, field.name)?,
        );
    }
    Ok(object)
}

fn is_empty_container(value: &FieldValue) -> bool {
    match value {
        FieldValue::List(items) => items.is_empty(),
        FieldValue::Map(entries) => entries.is_empty(),
        _ => false,
    }
}

fn value_to_json(
    value: &FieldValue,
    kind: &FieldKind,
    field_name: &str,
) -> Result<Value, WireError> {
    let mismatch = || WireError::TypeMismatch {
        field: field_name.to_string(),
        expected: kind_label(kind),
        found: value.kind_name(),
    };

    match (kind, value) {
        (FieldKind::Str, FieldValue::Str(s)) | (FieldKind::Enum, FieldValue::Enum(s)) => {
            Ok(Value::String(s.clone()))
        }
        // A plain string is accepted where an enum is declared; the wire
        // name is what matters.
        (FieldKind::Enum, FieldValue::Str(s)) => Ok(Value::String(s.clone())),
        (FieldKind::Int, FieldValue::Int(n)) => Ok(Value::Number((*n).into())),
        (FieldKind::Float, FieldValue::Float(f)) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .ok_or_else(|| WireError::UnrepresentableValue {
                field: field_name.to_string(),
                message: format!("{f} is not a finite number"),
            }),
        // Integers widen to float where the schema asks for one.
        #[allow(clippy::cast_precision_loss)]
        (FieldKind::Float, FieldValue::Int(n)) => serde_json::Number::from_f64(*n as f64)
            .map(Value::Number)
            .ok_or_else(mismatch),
        (FieldKind::Bool, FieldValue::Bool(b)) => Ok(Value::Bool(*b)),
        (FieldKind::Timestamp, FieldValue::Timestamp(t)) => Ok(Value::String(
            t.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        )),
        (FieldKind::Shape(nested_schema), FieldValue::Shape(nested)) => {
            // Nested shapes serialize all of their fields; bindings only
            // apply at the top level of a request.
            Ok(Value::Object(serialize_fields(nested, nested_schema, false)?))
        }
        (FieldKind::List(element_kind), FieldValue::List(items)) => {
            let mut array = Vec::with_capacity(items.len());
            for item in items {
                array.push(value_to_json(item, element_kind, field_name)?);
            }
            Ok(Value::Array(array))
        }
        (FieldKind::Map(value_kind), FieldValue::Map(entries)) => {
            let mut object = Map::new();
            for (key, entry) in entries {
                object.insert(key.clone(), value_to_json(entry, value_kind, field_name)?);
            }
            Ok(Value::Object(object))
        }
        _ => Err(mismatch()),
    }
}

fn value_from_json(
    value: &Value,
    kind: &FieldKind,
    field_name: &str,
) -> Result<FieldValue, WireError> {
    let mismatch = || WireError::TypeMismatch {
        field: field_name.to_string(),
        expected: kind_label(kind),
        found: json_kind_name(value),
    };

    match kind {
        FieldKind::Str => value
            .as_str()
            .map(|s| FieldValue::Str(s.to_string()))
            .ok_or_else(mismatch),
        FieldKind::Enum => value
            .as_str()
            .map(|s| FieldValue::Enum(s.to_string()))
            .ok_or_else(mismatch),
        FieldKind::Int => value.as_i64().map(FieldValue::Int).ok_or_else(mismatch),
        FieldKind::Float => value.as_f64().map(FieldValue::Float).ok_or_else(mismatch),
        FieldKind::Bool => value.as_bool().map(FieldValue::Bool).ok_or_else(mismatch),
        FieldKind::Timestamp => {
            let text = value.as_str().ok_or_else(mismatch)?;
            let parsed = chrono::DateTime::parse_from_rfc3339(text).map_err(|e| {
                WireError::MalformedDocument {
                    protocol: "JSON",
                    message: format!("invalid timestamp for '{field_name}': {e}"),
                }
            })?;
            Ok(FieldValue::Timestamp(parsed.with_timezone(&chrono::Utc)))
        }
        FieldKind::Shape(nested_schema) => {
            if !value.is_object() {
                return Err(mismatch());
            }
            Ok(FieldValue::Shape(deserialize_body(value, nested_schema)?))
        }
        FieldKind::List(element_kind) => {
            let array = value.as_array().ok_or_else(mismatch)?;
            let mut items = Vec::with_capacity(array.len());
            for item in array {
                items.push(value_from_json(item, element_kind, field_name)?);
            }
            Ok(FieldValue::List(items))
        }
        FieldKind::Map(value_kind) => {
            let object = value.as_object().ok_or_else(mismatch)?;
            let mut entries = std::collections::BTreeMap::new();
            for (key, entry) in object {
                entries.insert(key.clone(), value_from_json(entry, value_kind, field_name)?);
            }
            Ok(FieldValue::Map(entries))
        }
    }
}

const fn kind_label(kind: &FieldKind) -> &'static str {
    match kind {
        FieldKind::Str => "string",
        FieldKind::Int => "integer",
        FieldKind::Float => "float",
        FieldKind::Bool => "boolean",
        FieldKind::Timestamp => "timestamp",
        FieldKind::Enum => "enum",
        FieldKind::Shape(_) => "shape",
        FieldKind::List(_) => "list",
        FieldKind::Map(_) => "map",
    }
}

fn json_kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
