//! Error marshalling: turning non-2xx responses into [`ServiceError`]s.
//!
//! Services describe failures in their protocol's own dialect. JSON bodies
//! carry `__type` (possibly namespaced with a `#`) or `code` plus `message`;
//! XML and query-protocol bodies carry `<Error><Code>..</Code>
//! <Message>..</Message></Error>` with an optional `<RequestId>`. Anything
//! unparseable still becomes a `ServiceError` keyed off the HTTP status, so
//! a misbehaving service never crashes the caller.

use crate::outcome::ServiceError;
use crate::transport::RawResponse;
use crate::wire::{xml, WireProtocol};

/// Header carrying the service-assigned request id.
pub const REQUEST_ID_HEADER: &str = "X-Nimbus-Request-Id";

/// Error codes treated as retryable regardless of HTTP status.
const RETRYABLE_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "TooManyRequestsException",
    "RequestTimeout",
    "ServiceUnavailable",
    "SlowDown",
];

const UNKNOWN_CODE: &str = "UnknownError";

/// Builds a [`ServiceError`] from a non-2xx response.
#[must_use]
pub fn service_error(response: &RawResponse, protocol: WireProtocol) -> ServiceError {
    let (code, message, body_request_id) = match protocol {
        WireProtocol::Json => parse_json_error(&response.body),
        // Query-protocol services answer errors in XML.
        WireProtocol::Xml | WireProtocol::Query => parse_xml_error(&response.body),
    };

    let code = code.unwrap_or_else(|| UNKNOWN_CODE.to_string());
    let message = message.unwrap_or_else(|| {
        let body = response.body.trim();
        if body.is_empty() {
            format!("HTTP {} with no error body", response.status)
        } else {
            body.to_string()
        }
    });
    let request_id = response
        .header(REQUEST_ID_HEADER)
        .map(ToString::to_string)
        .or(body_request_id);
    let retryable = is_retryable(response.status, &code);

    ServiceError {
        code,
        message,
        http_status: response.status,
        retryable,
        request_id,
    }
}

fn is_retryable(status: u16, code: &str) -> bool {
    status == 429 || status >= 500 || RETRYABLE_CODES.contains(&code)
}

fn parse_json_error(body: &str) -> (Option<String>, Option<String>, Option<String>) {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return (None, None, None);
    };
    let code = ["__type", "code", "Code"]
        .iter()
        .find_map(|key| value.get(*key).and_then(serde_json::Value::as_str))
        .map(strip_type_namespace)
        .map(ToString::to_string);
    let message = ["message", "Message"]
        .iter()
        .find_map(|key| value.get(*key).and_then(serde_json::Value::as_str))
        .map(ToString::to_string);
    let request_id = ["RequestId", "requestId"]
        .iter()
        .find_map(|key| value.get(*key).and_then(serde_json::Value::as_str))
        .map(ToString::to_string);
    (code, message, request_id)
}

fn parse_xml_error(body: &str) -> (Option<String>, Option<String>, Option<String>) {
    let Ok(root) = xml::parse_document(body) else {
        return (None, None, None);
    };
    let error = root.find("Error");
    let text_of = |name: &str| {
        error
            .and_then(|e| e.find(name))
            .map(|node| node.text.clone())
            .filter(|text| !text.is_empty())
    };
    let code = text_of("Code");
    let message = text_of("Message");
    let request_id = root
        .find("RequestId")
        .map(|node| node.text.clone())
        .filter(|text| !text.is_empty());
    (code, message, request_id)
}

/// Strips a `namespace#` prefix from a `__type` value.
fn strip_type_namespace(full_type: &str) -> &str {
    full_type
        .rsplit_once('#')
        .map_or(full_type, |(_, name)| name)
}
