//! XML body serialization and deserialization.
//!
//! The same schema walk as the JSON serializer, rendered through
//! `quick-xml`'s event API. The shape's schema name is the root element;
//! list items nest as `<member>` elements and map entries as
//! `<entry><key>..</key><value>..</value></entry>`.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::shape::{FieldBinding, FieldKind, FieldValue, Shape, ShapeSchema};
use crate::wire::WireError;

/// Serializes the body-bound fields of a shape into an XML document string.
///
/// Returns `None` when no body-bound field has been set.
///
/// # Errors
///
/// Returns [`WireError`] if a set value contradicts its schema kind or the
/// document cannot be written.
pub fn serialize_body(shape: &Shape, schema: &ShapeSchema) -> Result<Option<String>, WireError> {
    let has_body_field = schema
        .fields_with_binding(FieldBinding::Body)
        .any(|f| shape.get(f.name).is_some_and(|v| !is_empty_container(v)));
    if !has_body_field {
        return Ok(None);
    }

    let mut writer = Writer::new(Vec::new());
    write_start(&mut writer, schema.name)?;
    for field in schema.fields_with_binding(FieldBinding::Body) {
        if let Some(value) = shape.get(field.name) {
            write_field(&mut writer, field.wire_name, value, &field.kind, field.name)?;
        }
    }
    write_end(&mut writer, schema.name)?;

    String::from_utf8(writer.into_inner())
        .map(Some)
        .map_err(|e| malformed(e.to_string()))
}

/// Deserializes an XML document into a shape.
///
/// Only elements present in the document are set; unknown elements are
/// ignored for forward compatibility.
///
/// # Errors
///
/// Returns [`WireError`] if the document cannot be parsed or a present value
/// cannot be read as its declared kind.
pub fn deserialize_body(document: &str, schema: &ShapeSchema) -> Result<Shape, WireError> {
    let root = parse_document(document)?;
    // Responses are sometimes wrapped in an outer result element; unwrap one
    // level when the inner element carries the schema name.
    let node = root
        .children
        .iter()
        .find(|c| c.name == schema.name)
        .unwrap_or(&root);
    node_to_shape(node, schema)
}

/// A parsed XML element, kept crate-internal for the error marshaller.
#[derive(Debug, Clone, Default)]
pub(crate) struct XmlNode {
    pub(crate) name: String,
    pub(crate) text: String,
    pub(crate) children: Vec<XmlNode>,
}

impl XmlNode {
    /// Finds the first descendant element with the given name,
    /// depth-first.
    pub(crate) fn find(&self, name: &str) -> Option<&Self> {
        for child in &self.children {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find(name) {
                return Some(found);
            }
        }
        None
    }
}

/// Parses an XML document into an element tree.
pub(crate) fn parse_document(document: &str) -> Result<XmlNode, WireError> {
    let mut reader = Reader::from_str(document);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        match reader.read_event().map_err(|e| malformed(e.to_string()))? {
            Event::Start(start) => {
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                stack.push(XmlNode {
                    name,
                    ..XmlNode::default()
                });
            }
            Event::Empty(start) => {
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                let node = XmlNode {
                    name,
                    ..XmlNode::default()
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => root = Some(node),
                }
            }
            Event::Text(text) => {
                let unescaped = text.unescape().map_err(|e| malformed(e.to_string()))?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&unescaped);
                }
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| malformed("unbalanced end tag".to_string()))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => root = Some(node),
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions
            _ => {}
        }
    }

    root.ok_or_else(|| malformed("empty document".to_string()))
}

fn node_to_shape(node: &XmlNode, schema: &ShapeSchema) -> Result<Shape, WireError> {
    let mut shape = Shape::new();
    for child in &node.children {
        let Some(field) = schema.field_by_wire_name(&child.name) else {
            continue; // unknown element, tolerate for forward compatibility
        };
        let value = value_from_node(child, &field.kind, field.name)?;
        shape.set(field.name, value);
    }
    Ok(shape)
}

fn value_from_node(
    node: &XmlNode,
    kind: &FieldKind,
    field_name: &str,
) -> Result<FieldValue, WireError> {
    let parse_error = |message: String| WireError::MalformedDocument {
        protocol: "XML",
        message: format!("field '{field_name}': {message}"),
    };

    match kind {
        FieldKind::Str => Ok(FieldValue::Str(node.text.clone())),
        FieldKind::Enum => Ok(FieldValue::Enum(node.text.clone())),
        FieldKind::Int => node
            .text
            .parse::<i64>()
            .map(FieldValue::Int)
            .map_err(|e| parse_error(e.to_string())),
        FieldKind::Float => node
            .text
            .parse::<f64>()
            .map(FieldValue::Float)
            .map_err(|e| parse_error(e.to_string())),
        FieldKind::Bool => match node.text.as_str() {
            "true" => Ok(FieldValue::Bool(true)),
            "false" => Ok(FieldValue::Bool(false)),
            other => Err(parse_error(format!("'{other}' is not a boolean"))),
        },
        FieldKind::Timestamp => chrono::DateTime::parse_from_rfc3339(&node.text)
            .map(|t| FieldValue::Timestamp(t.with_timezone(&chrono::Utc)))
            .map_err(|e| parse_error(e.to_string())),
        FieldKind::Shape(nested_schema) => {
            Ok(FieldValue::Shape(node_to_shape(node, nested_schema)?))
        }
        FieldKind::List(element_kind) => {
            let mut items = Vec::new();
            for member in node.children.iter().filter(|c| c.name == "member") {
                items.push(value_from_node(member, element_kind, field_name)?);
            }
            Ok(FieldValue::List(items))
        }
        FieldKind::Map(value_kind) => {
            let mut entries = std::collections::BTreeMap::new();
            for entry in node.children.iter().filter(|c| c.name == "entry") {
                let key = entry
                    .find("key")
                    .ok_or_else(|| parse_error("map entry without key".to_string()))?
                    .text
                    .clone();
                let value_node = entry
                    .find("value")
                    .ok_or_else(|| parse_error("map entry without value".to_string()))?;
                entries.insert(key, value_from_node(value_node, value_kind, field_name)?);
            }
            Ok(FieldValue::Map(entries))
        }
    }
}

fn write_field(
    writer: &mut Writer<Vec<u8>>,
    wire_name: &str,
    value: &FieldValue,
    kind: &FieldKind,
    field_name: &str,
) -> Result<(), WireError> {
    if is_empty_container(value) {
        return Ok(());
    }

    let mismatch = || WireError::TypeMismatch {
        field: field_name.to_string(),
        expected: "value matching schema kind",
        found: value.kind_name(),
    };

    match (kind, value) {
        (FieldKind::Shape(nested_schema), FieldValue::Shape(nested)) => {
            write_start(writer, wire_name)?;
            for field in nested_schema.fields {
                if let Some(nested_value) = nested.get(field.name) {
                    write_field(writer, field.wire_name, nested_value, &field.kind, field.name)?;
                }
            }
            write_end(writer, wire_name)
        }
        (FieldKind::List(element_kind), FieldValue::List(items)) => {
            write_start(writer, wire_name)?;
            for item in items {
                write_field(writer, "member", item, element_kind, field_name)?;
            }
            write_end(writer, wire_name)
        }
        (FieldKind::Map(value_kind), FieldValue::Map(entries)) => {
            write_start(writer, wire_name)?;
            for (key, entry) in entries {
                write_start(writer, "entry")?;
                write_text_element(writer, "key", key)?;
                write_field(writer, "value", entry, value_kind, field_name)?;
                write_end(writer, "entry")?;
            }
            write_end(writer, wire_name)
        }
        _ => {
            let text = match (kind, value) {
                (FieldKind::Str, FieldValue::Str(s))
                | (FieldKind::Enum, FieldValue::Enum(s) | FieldValue::Str(s)) => s.clone(),
                (FieldKind::Int, FieldValue::Int(n)) => n.to_string(),
                (FieldKind::Float, FieldValue::Float(f)) => f.to_string(),
                (FieldKind::Bool, FieldValue::Bool(b)) => b.to_string(),
                (FieldKind::Timestamp, FieldValue::Timestamp(t)) => {
                    t.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
                }
                _ => return Err(mismatch()),
            };
            write_text_element(writer, wire_name, &text)
        }
    }
}

fn write_start(writer: &mut Writer<Vec<u8>>, name: &str) -> Result<(), WireError> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(|e| malformed(e.to_string()))
}

fn write_end(writer: &mut Writer<Vec<u8>>, name: &str) -> Result<(), WireError> {
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(|e| malformed(e.to_string()))
}

fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    text: &str,
) -> Result<(), WireError> {
    write_start(writer, name)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(|e| malformed(e.to_string()))?;
    write_end(writer, name)
}

fn is_empty_container(value: &FieldValue) -> bool {
    match value {
        FieldValue::List(items) => items.is_empty(),
        FieldValue::Map(entries) => entries.is_empty(),
        _ => false,
    }
}

fn malformed(message: String) -> WireError {
    WireError::MalformedDocument {
        protocol: "XML",
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::FieldSchema;
    use std::collections::BTreeMap;

    const ATTRIBUTES: ShapeSchema = ShapeSchema::new(
        "Attributes",
        &[FieldSchema::new(
            "VisibilityTimeout",
            "VisibilityTimeout",
            FieldKind::Int,
            FieldBinding::Body,
        )],
    );

    const SCHEMA: ShapeSchema = ShapeSchema::new(
        "CreateQueueInput",
        &[
            FieldSchema::new("QueueName", "QueueName", FieldKind::Str, FieldBinding::Body),
            FieldSchema::new(
                "DelaySeconds",
                "DelaySeconds",
                FieldKind::Int,
                FieldBinding::Body,
            ),
            FieldSchema::new(
                "Attributes",
                "Attributes",
                FieldKind::Shape(&ATTRIBUTES),
                FieldBinding::Body,
            ),
            FieldSchema::new(
                "Subscribers",
                "Subscribers",
                FieldKind::List(&FieldKind::Str),
                FieldBinding::Body,
            ),
            FieldSchema::new(
                "Tags",
                "Tags",
                FieldKind::Map(&FieldKind::Str),
                FieldBinding::Body,
            ),
        ],
    );

    #[test]
    fn test_serialize_wraps_fields_in_schema_root() {
        let shape = Shape::new().with("QueueName", "jobs");
        let body = serialize_body(&shape, &SCHEMA).unwrap().unwrap();
        assert_eq!(
            body,
            "<CreateQueueInput><QueueName>jobs</QueueName></CreateQueueInput>"
        );
    }

    #[test]
    fn test_empty_shape_produces_no_body() {
        assert!(serialize_body(&Shape::new(), &SCHEMA).unwrap().is_none());
    }

    #[test]
    fn test_list_serializes_as_member_elements() {
        let shape = Shape::new().with("Subscribers", vec!["a".to_string(), "b".to_string()]);
        let body = serialize_body(&shape, &SCHEMA).unwrap().unwrap();
        assert!(body.contains("<Subscribers><member>a</member><member>b</member></Subscribers>"));
    }

    #[test]
    fn test_empty_containers_are_omitted() {
        let shape = Shape::new()
            .with("QueueName", "jobs")
            .with("Subscribers", Vec::<FieldValue>::new());
        let body = serialize_body(&shape, &SCHEMA).unwrap().unwrap();
        assert!(!body.contains("Subscribers"));
    }

    #[test]
    fn test_text_is_escaped() {
        let shape = Shape::new().with("QueueName", "a<b&c");
        let body = serialize_body(&shape, &SCHEMA).unwrap().unwrap();
        assert!(body.contains("a&lt;b&amp;c"));
    }

    #[test]
    fn test_roundtrip_preserves_set_fields() {
        let nested = Shape::new().with("VisibilityTimeout", 60_i64);
        let mut tags = BTreeMap::new();
        tags.insert("team".to_string(), FieldValue::Str("infra".to_string()));
        let shape = Shape::new()
            .with("QueueName", "jobs")
            .with("DelaySeconds", 0_i64)
            .with("Attributes", nested.clone())
            .with("Subscribers", vec!["a".to_string()])
            .with("Tags", tags.clone());

        let body = serialize_body(&shape, &SCHEMA).unwrap().unwrap();
        let restored = deserialize_body(&body, &SCHEMA).unwrap();

        assert_eq!(restored.str_field("QueueName"), "jobs");
        assert!(restored.has_been_set("DelaySeconds"));
        assert_eq!(restored.int_field("DelaySeconds"), 0);
        assert_eq!(restored.shape_field("Attributes"), &nested);
        assert_eq!(restored.list_field("Subscribers").len(), 1);
        assert_eq!(restored.map_field("Tags"), &tags);
    }

    #[test]
    fn test_deserialize_ignores_unknown_elements() {
        let document =
            "<CreateQueueInput><QueueName>jobs</QueueName><Future>x</Future></CreateQueueInput>";
        let shape = deserialize_body(document, &SCHEMA).unwrap();
        assert_eq!(shape.len(), 1);
        assert_eq!(shape.str_field("QueueName"), "jobs");
    }

    #[test]
    fn test_deserialize_unwraps_result_wrapper() {
        let document = "<CreateQueueResponse><CreateQueueInput><QueueName>jobs</QueueName></CreateQueueInput></CreateQueueResponse>";
        let shape = deserialize_body(document, &SCHEMA).unwrap();
        assert_eq!(shape.str_field("QueueName"), "jobs");
    }

    #[test]
    fn test_deserialize_rejects_bad_scalar() {
        let document = "<CreateQueueInput><DelaySeconds>soon</DelaySeconds></CreateQueueInput>";
        let err = deserialize_body(document, &SCHEMA).unwrap_err();
        assert!(matches!(err, WireError::MalformedDocument { .. }));
    }

    #[test]
    fn test_parse_document_find_descends() {
        let document = "<ErrorResponse><Error><Code>Throttling</Code></Error></ErrorResponse>";
        let root = parse_document(document).unwrap();
        assert_eq!(root.find("Code").unwrap().text, "Throttling");
    }
}
