//! Operation schemas and the request object handed to the dispatcher.
//!
//! An [`OperationSchema`] is a const description of one API operation: its
//! name, HTTP method, URI path template, wire protocol, and input and output
//! shape schemas. A [`Request`] pairs an operation with an input [`Shape`]
//! and knows how to render itself into the protocol-independent
//! [`RequestPayload`] the transport ships.

use crate::shape::{FieldBinding, FieldValue, Shape, ShapeSchema};
use crate::wire::{self, WireError, WireProtocol};

/// HTTP methods used by API operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
}

impl HttpMethod {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Const description of a single API operation.
///
/// Service definitions declare these as `const` items, one per operation,
/// and hand them to [`Request::new`].
#[derive(Debug, Clone, Copy)]
pub struct OperationSchema {
    /// Operation name, e.g. `"CreateQueue"`.
    pub name: &'static str,
    pub method: HttpMethod,
    /// URI path template with `{FieldName}` placeholders resolved from
    /// URI-bound input fields, e.g. `"/queues/{QueueName}"`.
    pub path_template: &'static str,
    /// Optional host prefix template prepended to the resolved endpoint
    /// host, e.g. `"{BucketName}."`.
    pub host_prefix: Option<&'static str>,
    pub protocol: WireProtocol,
    pub input: &'static ShapeSchema,
    pub output: &'static ShapeSchema,
}

impl OperationSchema {
    #[must_use]
    pub const fn new(
        name: &'static str,
        method: HttpMethod,
        path_template: &'static str,
        protocol: WireProtocol,
        input: &'static ShapeSchema,
        output: &'static ShapeSchema,
    ) -> Self {
        Self {
            name,
            method,
            path_template,
            host_prefix: None,
            protocol,
            input,
            output,
        }
    }

    #[must_use]
    pub const fn with_host_prefix(mut self, host_prefix: &'static str) -> Self {
        self.host_prefix = Some(host_prefix);
        self
    }
}

/// The wire-ready rendering of a request, independent of transport.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestPayload {
    /// Resolved URI path with all placeholders interpolated.
    pub path: String,
    /// Query-string pairs, unencoded, in schema order.
    pub query: Vec<(String, String)>,
    /// Header pairs contributed by header-bound fields.
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    /// Present exactly when `body` is present.
    pub content_type: Option<&'static str>,
}

/// One in-flight API call: an operation plus its input shape.
///
/// Requests are plain values. Cloning one yields an independent request,
/// which is what lets the dispatcher hand copies to spawned futures.
///
/// # Example
///
/// ```rust,ignore
/// let request = Request::new(&CREATE_QUEUE)
///     .with("QueueName", "jobs")
///     .with("DelaySeconds", 30_i64);
/// let outcome = client.call(request).await;
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    operation: &'static OperationSchema,
    input: Shape,
}

impl Request {
    #[must_use]
    pub const fn new(operation: &'static OperationSchema) -> Self {
        Self {
            operation,
            input: Shape::new(),
        }
    }

    /// Sets an input field, builder style.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.input.set(name, value);
        self
    }

    /// Sets an input field in place.
    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) {
        self.input.set(name, value);
    }

    #[must_use]
    pub const fn operation(&self) -> &'static OperationSchema {
        self.operation
    }

    #[must_use]
    pub const fn input(&self) -> &Shape {
        &self.input
    }

    /// Renders the request into a transport-ready payload.
    ///
    /// URI-bound fields interpolate into the path template; query-bound
    /// fields become query pairs; header-bound fields become header pairs;
    /// body-bound fields serialize per the operation's wire protocol. The
    /// rendering is deterministic: the same request serializes to the same
    /// payload every time.
    ///
    /// # Errors
    ///
    /// Returns [`WireError`] when a path placeholder refers to an unset
    /// field or a set value contradicts its schema kind.
    pub fn serialize(&self) -> Result<RequestPayload, WireError> {
        let schema = self.operation.input;
        let path = interpolate(self.operation.path_template, &self.input, schema, true)?;
        let query = wire::query::serialize_query_pairs(&self.input, schema)?;
        let headers = wire::serialize_headers(&self.input, schema)?;

        let body = match self.operation.protocol {
            WireProtocol::Json => wire::json::serialize_body(&self.input, schema)?,
            WireProtocol::Xml => wire::xml::serialize_body(&self.input, schema)?,
            WireProtocol::Query => {
                // The query protocol always carries a form body naming the
                // operation, even when no body fields are set.
                let mut pairs = vec![("Action".to_string(), self.operation.name.to_string())];
                pairs.extend(wire::query::serialize_form_pairs(&self.input, schema)?);
                Some(wire::query::encode_pairs(&pairs))
            }
        };
        let content_type = body.as_ref().map(|_| self.operation.protocol.content_type());

        Ok(RequestPayload {
            path,
            query,
            headers,
            body,
            content_type,
        })
    }

    /// Resolves the operation's host prefix template, if any, against the
    /// input shape.
    ///
    /// # Errors
    ///
    /// Returns [`WireError`] when a placeholder refers to an unset field.
    pub fn resolve_host_prefix(&self) -> Result<Option<String>, WireError> {
        self.operation
            .host_prefix
            .map(|template| interpolate(template, &self.input, self.operation.input, false))
            .transpose()
    }
}

/// Replaces `{FieldName}` placeholders with the field's wire string.
///
/// Path segments are percent-encoded; host prefixes are not, since DNS
/// labels reject percent escapes anyway.
fn interpolate(
    template: &str,
    shape: &Shape,
    schema: &ShapeSchema,
    encode: bool,
) -> Result<String, WireError> {
    let mut resolved = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        resolved.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];
        let close = after_open
            .find('}')
            .ok_or_else(|| WireError::UnrepresentableValue {
                field: template.to_string(),
                message: "unterminated '{' in template".to_string(),
            })?;
        let field_name = &after_open[..close];

        match schema.field(field_name) {
            Some(field) if field.binding == FieldBinding::Uri => {}
            Some(_) => {
                return Err(WireError::UnrepresentableValue {
                    field: field_name.to_string(),
                    message: "named by the URI template but not bound to the URI".to_string(),
                })
            }
            None => {
                return Err(WireError::UnrepresentableValue {
                    field: field_name.to_string(),
                    message: "named by the URI template but unknown to the input schema"
                        .to_string(),
                })
            }
        }
        let value = shape.get(field_name).ok_or_else(|| WireError::UnrepresentableValue {
            field: field_name.to_string(),
            message: "required by the URI template but not set".to_string(),
        })?;
        let text = value
            .to_wire_string()
            .ok_or_else(|| WireError::TypeMismatch {
                field: field_name.to_string(),
                expected: "scalar value for URI template",
                found: value.kind_name(),
            })?;
        if encode {
            resolved.push_str(&urlencoding::encode(&text));
        } else {
            resolved.push_str(&text);
        }
        rest = &after_open[close + 1..];
    }
    resolved.push_str(rest);
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{FieldKind, FieldSchema};

    const INPUT: ShapeSchema = ShapeSchema::new(
        "SendMessageInput",
        &[
            FieldSchema::new("QueueName", "QueueName", FieldKind::Str, FieldBinding::Uri),
            FieldSchema::new("Body", "MessageBody", FieldKind::Str, FieldBinding::Body),
            FieldSchema::new(
                "DelaySeconds",
                "DelaySeconds",
                FieldKind::Int,
                FieldBinding::Query,
            ),
            FieldSchema::new(
                "TraceId",
                "X-Nimbus-Trace-Id",
                FieldKind::Str,
                FieldBinding::Header,
            ),
        ],
    );

    const OUTPUT: ShapeSchema = ShapeSchema::new(
        "SendMessageOutput",
        &[FieldSchema::new(
            "MessageId",
            "MessageId",
            FieldKind::Str,
            FieldBinding::Body,
        )],
    );

    const SEND_MESSAGE: OperationSchema = OperationSchema::new(
        "SendMessage",
        HttpMethod::Post,
        "/queues/{QueueName}/messages",
        WireProtocol::Json,
        &INPUT,
        &OUTPUT,
    );

    const SEND_MESSAGE_QUERY: OperationSchema = OperationSchema::new(
        "SendMessage",
        HttpMethod::Post,
        "/",
        WireProtocol::Query,
        &INPUT,
        &OUTPUT,
    );

    #[test]
    fn test_serialize_interpolates_path_template() {
        let request = Request::new(&SEND_MESSAGE)
            .with("QueueName", "jobs")
            .with("Body", "hello");
        let payload = request.serialize().unwrap();
        assert_eq!(payload.path, "/queues/jobs/messages");
    }

    #[test]
    fn test_path_segments_are_percent_encoded() {
        let request = Request::new(&SEND_MESSAGE)
            .with("QueueName", "jobs queue")
            .with("Body", "hello");
        let payload = request.serialize().unwrap();
        assert_eq!(payload.path, "/queues/jobs%20queue/messages");
    }

    #[test]
    fn test_unset_path_field_is_an_error() {
        let request = Request::new(&SEND_MESSAGE).with("Body", "hello");
        let err = request.serialize().unwrap_err();
        assert!(matches!(err, WireError::UnrepresentableValue { ref field, .. } if field == "QueueName"));
    }

    #[test]
    fn test_non_uri_placeholder_is_an_error() {
        const BAD_BINDING: OperationSchema = OperationSchema::new(
            "SendMessage",
            HttpMethod::Post,
            "/queues/{Body}",
            WireProtocol::Json,
            &INPUT,
            &OUTPUT,
        );
        let request = Request::new(&BAD_BINDING).with("Body", "hello");
        let err = request.serialize().unwrap_err();
        assert!(matches!(
            err,
            WireError::UnrepresentableValue { ref message, .. }
                if message.contains("not bound to the URI")
        ));
    }

    #[test]
    fn test_unknown_placeholder_is_an_error() {
        const UNKNOWN_FIELD: OperationSchema = OperationSchema::new(
            "SendMessage",
            HttpMethod::Post,
            "/queues/{Missing}",
            WireProtocol::Json,
            &INPUT,
            &OUTPUT,
        );
        let request = Request::new(&UNKNOWN_FIELD).with("QueueName", "jobs");
        let err = request.serialize().unwrap_err();
        assert!(matches!(
            err,
            WireError::UnrepresentableValue { ref message, .. }
                if message.contains("unknown to the input schema")
        ));
    }

    #[test]
    fn test_bindings_route_to_payload_sections() {
        let request = Request::new(&SEND_MESSAGE)
            .with("QueueName", "jobs")
            .with("Body", "hello")
            .with("DelaySeconds", 30_i64)
            .with("TraceId", "abc-123");
        let payload = request.serialize().unwrap();

        assert_eq!(
            payload.query,
            vec![("DelaySeconds".to_string(), "30".to_string())]
        );
        assert_eq!(
            payload.headers,
            vec![("X-Nimbus-Trace-Id".to_string(), "abc-123".to_string())]
        );
        assert_eq!(payload.body.as_deref(), Some(r#"{"MessageBody":"hello"}"#));
        assert_eq!(payload.content_type, Some("application/json"));
    }

    #[test]
    fn test_json_body_absent_when_no_body_fields_set() {
        let request = Request::new(&SEND_MESSAGE).with("QueueName", "jobs");
        let payload = request.serialize().unwrap();
        assert!(payload.body.is_none());
        assert!(payload.content_type.is_none());
    }

    #[test]
    fn test_query_protocol_always_names_the_action() {
        let request = Request::new(&SEND_MESSAGE_QUERY)
            .with("QueueName", "jobs")
            .with("Body", "a b");
        let payload = request.serialize().unwrap();
        assert_eq!(
            payload.body.as_deref(),
            Some("Action=SendMessage&MessageBody=a%20b")
        );
        assert_eq!(
            payload.content_type,
            Some("application/x-www-form-urlencoded")
        );
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let request = Request::new(&SEND_MESSAGE)
            .with("QueueName", "jobs")
            .with("Body", "hello")
            .with("DelaySeconds", 0_i64);
        assert_eq!(request.serialize().unwrap(), request.serialize().unwrap());
    }

    #[test]
    fn test_host_prefix_resolution() {
        const PREFIXED: OperationSchema = OperationSchema::new(
            "SendMessage",
            HttpMethod::Post,
            "/messages",
            WireProtocol::Json,
            &INPUT,
            &OUTPUT,
        )
        .with_host_prefix("{QueueName}.");

        let request = Request::new(&PREFIXED).with("QueueName", "jobs");
        assert_eq!(request.resolve_host_prefix().unwrap().as_deref(), Some("jobs."));

        let plain = Request::new(&SEND_MESSAGE);
        assert_eq!(plain.resolve_host_prefix().unwrap(), None);
    }
}
