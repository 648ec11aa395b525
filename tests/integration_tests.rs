//! End-to-end dispatch tests against a local mock server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use wiremock::matchers::{body_string, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nimbus_sdk_core::{
    Credentials, EndpointUrl, FieldBinding, FieldKind, FieldSchema, HttpMethod, OperationSchema,
    RawRequest, RawResponse, Region, Request, SdkConfig, SdkError, ServiceClient, ServiceId, Shape,
    ShapeSchema, StaticCredentialsProvider, Transport, TransportError, WireProtocol,
};

const CREATE_QUEUE_INPUT: ShapeSchema = ShapeSchema::new(
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
            "Tags",
            "Tags",
            FieldKind::Map(&FieldKind::Str),
            FieldBinding::Body,
        ),
    ],
);

const CREATE_QUEUE_OUTPUT: ShapeSchema = ShapeSchema::new(
    "CreateQueueOutput",
    &[FieldSchema::new(
        "QueueUrl",
        "QueueUrl",
        FieldKind::Str,
        FieldBinding::Body,
    )],
);

const CREATE_QUEUE: OperationSchema = OperationSchema::new(
    "CreateQueue",
    HttpMethod::Post,
    "/queues",
    WireProtocol::Json,
    &CREATE_QUEUE_INPUT,
    &CREATE_QUEUE_OUTPUT,
);

const GET_MESSAGE_INPUT: ShapeSchema = ShapeSchema::new(
    "GetMessageInput",
    &[
        FieldSchema::new("QueueName", "QueueName", FieldKind::Str, FieldBinding::Uri),
        FieldSchema::new(
            "MaxMessages",
            "MaxMessages",
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

const GET_MESSAGE_OUTPUT: ShapeSchema = ShapeSchema::new(
    "GetMessageOutput",
    &[FieldSchema::new(
        "Body",
        "Body",
        FieldKind::Str,
        FieldBinding::Body,
    )],
);

const GET_MESSAGE: OperationSchema = OperationSchema::new(
    "GetMessage",
    HttpMethod::Get,
    "/queues/{QueueName}/message",
    WireProtocol::Json,
    &GET_MESSAGE_INPUT,
    &GET_MESSAGE_OUTPUT,
);

const DELETE_QUEUE: OperationSchema = OperationSchema::new(
    "DeleteQueue",
    HttpMethod::Post,
    "/",
    WireProtocol::Query,
    &GET_MESSAGE_INPUT,
    &GET_MESSAGE_OUTPUT,
);

fn test_credentials() -> StaticCredentialsProvider {
    StaticCredentialsProvider::new(Credentials::new("AKNIMBUSTEST", "test-secret").unwrap())
}

async fn client_for(server: &MockServer) -> ServiceClient {
    ServiceClient::builder(ServiceId::new("queue").unwrap())
        .config(
            SdkConfig::builder()
                .endpoint_url(EndpointUrl::new(server.uri()).unwrap())
                .build(),
        )
        .credentials_provider(test_credentials())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_successful_json_dispatch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/queues"))
        .and(header("Content-Type", "application/json"))
        .and(body_string(r#"{"QueueName":"jobs","DelaySeconds":30}"#))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"QueueUrl":"https://queue.test/jobs"}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let request = Request::new(&CREATE_QUEUE)
        .with("QueueName", "jobs")
        .with("DelaySeconds", 30_i64);
    let outcome = client.call(request).await;

    assert!(outcome.is_success());
    assert_eq!(
        outcome.result().str_field("QueueUrl"),
        "https://queue.test/jobs"
    );
}

#[tokio::test]
async fn test_unset_fields_are_omitted_but_set_fields_emit() {
    let server = MockServer::start().await;
    // QueueName stays unset; only Tags goes on the wire.
    Mock::given(method("POST"))
        .and(path("/queues"))
        .and(body_string(r#"{"Tags":{"team":"infra"}}"#))
        .respond_with(ResponseTemplate::new(400).set_body_string(
            r#"{"__type":"ValidationError","message":"QueueName is required"}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let mut tags = std::collections::BTreeMap::new();
    tags.insert(
        "team".to_string(),
        nimbus_sdk_core::FieldValue::Str("infra".to_string()),
    );
    let outcome = client.call(Request::new(&CREATE_QUEUE).with("Tags", tags)).await;

    assert!(!outcome.is_success());
    let SdkError::Service(error) = outcome.error() else {
        panic!("expected a service error, got {:?}", outcome.error());
    };
    assert_eq!(error.code, "ValidationError");
    assert_eq!(error.http_status, 400);
    assert!(!error.retryable);
}

#[tokio::test]
async fn test_uri_query_and_header_bindings_reach_the_wire() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/queues/jobs/message"))
        .and(query_param("MaxMessages", "5"))
        .and(header("X-Nimbus-Trace-Id", "trace-7"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"Body":"hello"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let request = Request::new(&GET_MESSAGE)
        .with("QueueName", "jobs")
        .with("MaxMessages", 5_i64)
        .with("TraceId", "trace-7");
    let outcome = client.call(request).await;

    assert!(outcome.is_success());
    assert_eq!(outcome.result().str_field("Body"), "hello");
}

#[tokio::test]
async fn test_requests_carry_signature_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/queues"))
        .and(wiremock::matchers::header_exists("Authorization"))
        .and(wiremock::matchers::header_exists("X-Nimbus-Date"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let outcome = client
        .call(Request::new(&CREATE_QUEUE).with("QueueName", "jobs"))
        .await;
    assert!(outcome.is_success());
}

#[tokio::test]
async fn test_query_protocol_sends_form_body_and_parses_xml_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("Content-Type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("Action=DeleteQueue"))
        .respond_with(ResponseTemplate::new(400).set_body_string(
            "<ErrorResponse><Error><Code>NoSuchQueue</Code><Message>gone</Message></Error><RequestId>req-3</RequestId></ErrorResponse>",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let outcome = client.call(Request::new(&DELETE_QUEUE)).await;

    let SdkError::Service(error) = outcome.error() else {
        panic!("expected a service error");
    };
    assert_eq!(error.code, "NoSuchQueue");
    assert_eq!(error.request_id.as_deref(), Some("req-3"));
}

#[tokio::test]
async fn test_service_error_carries_request_id_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/queues"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_string(r#"{"__type":"AccessDenied","message":"nope"}"#)
                .insert_header("X-Nimbus-Request-Id", "req-42"),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let outcome = client
        .call(Request::new(&CREATE_QUEUE).with("QueueName", "jobs"))
        .await;

    let SdkError::Service(error) = outcome.error() else {
        panic!("expected a service error");
    };
    assert_eq!(error.code, "AccessDenied");
    assert_eq!(error.request_id.as_deref(), Some("req-42"));
}

/// A transport that records every dispatch and answers 200.
#[derive(Clone, Default)]
struct CountingTransport {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Transport for CountingTransport {
    async fn dispatch(&self, _request: RawRequest) -> Result<RawResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(RawResponse {
            status: 200,
            headers: Vec::new(),
            body: "{}".to_string(),
        })
    }
}

#[tokio::test]
async fn test_missing_endpoint_fails_before_the_transport() {
    let transport = CountingTransport::default();
    let calls = Arc::clone(&transport.calls);

    // No region and no endpoint URL: there is nothing to resolve against.
    let client = ServiceClient::builder(ServiceId::new("queue").unwrap())
        .config(SdkConfig::builder().build())
        .credentials_provider(test_credentials())
        .transport(transport)
        .build()
        .unwrap();

    let outcome = client
        .call(Request::new(&CREATE_QUEUE).with("QueueName", "jobs"))
        .await;

    assert!(!outcome.is_success());
    assert!(matches!(
        outcome.error(),
        SdkError::EndpointResolution { .. }
    ));
    assert!(!outcome.error().is_retryable());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_region_without_endpoint_override_resolves_regional_host() {
    #[derive(Clone, Default)]
    struct CapturingTransport {
        url: Arc<std::sync::Mutex<String>>,
    }

    #[async_trait]
    impl Transport for CapturingTransport {
        async fn dispatch(&self, request: RawRequest) -> Result<RawResponse, TransportError> {
            *self.url.lock().unwrap() = request.url;
            Ok(RawResponse {
                status: 200,
                headers: Vec::new(),
                body: "{}".to_string(),
            })
        }
    }

    let transport = CapturingTransport::default();
    let url = Arc::clone(&transport.url);
    let client = ServiceClient::builder(ServiceId::new("queue").unwrap())
        .config(
            SdkConfig::builder()
                .region(Region::new("us-east-1").unwrap())
                .build(),
        )
        .credentials_provider(test_credentials())
        .transport(transport)
        .build()
        .unwrap();

    let outcome = client
        .call(Request::new(&CREATE_QUEUE).with("QueueName", "jobs"))
        .await;

    assert!(outcome.is_success());
    assert_eq!(
        url.lock().unwrap().as_str(),
        "https://queue.us-east-1.nimbus.cloud/queues"
    );
}

#[tokio::test]
async fn test_three_concurrent_calls_do_not_cross_talk() {
    let server = MockServer::start().await;
    for name in ["alpha", "beta", "gamma"] {
        Mock::given(method("GET"))
            .and(path(format!("/queues/{name}/message")))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(format!(r#"{{"Body":"from-{name}"}}"#)),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = client_for(&server).await;
    let call_for = |name: &str| client.call(Request::new(&GET_MESSAGE).with("QueueName", name));
    let (a, b, c) = tokio::join!(call_for("alpha"), call_for("beta"), call_for("gamma"));

    assert_eq!(a.result().str_field("Body"), "from-alpha");
    assert_eq!(b.result().str_field("Body"), "from-beta");
    assert_eq!(c.result().str_field("Body"), "from-gamma");
}

#[tokio::test]
async fn test_call_callable_resolves_to_the_same_outcome() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/queues"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"QueueUrl":"https://queue.test/jobs"}"#),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let pending = client.call_callable(Request::new(&CREATE_QUEUE).with("QueueName", "jobs"));
    let outcome = pending.await;

    assert!(outcome.is_success());
    assert_eq!(
        outcome.result().str_field("QueueUrl"),
        "https://queue.test/jobs"
    );
}

#[tokio::test]
async fn test_call_with_handler_delivers_the_outcome() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/queues"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let (tx, rx) = tokio::sync::oneshot::channel::<Shape>();
    client.call_with_handler(
        Request::new(&CREATE_QUEUE).with("QueueName", "jobs"),
        move |outcome| {
            let _ = tx.send(outcome.into_result().expect("dispatch should succeed"));
        },
    );

    let shape = rx.await.unwrap();
    assert!(shape.is_empty());
}

#[tokio::test]
async fn test_transport_retries_429_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/queues"))
        .respond_with(
            ResponseTemplate::new(429).insert_header("Retry-After", "0"),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/queues"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"QueueUrl":"https://queue.test/jobs"}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let outcome = client
        .call(Request::new(&CREATE_QUEUE).with("QueueName", "jobs"))
        .await;

    assert!(outcome.is_success());
}

#[tokio::test]
async fn test_exhausted_retries_surface_as_retryable_service_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/queues"))
        .respond_with(ResponseTemplate::new(503).set_body_string(
            r#"{"__type":"ServiceUnavailable","message":"try later"}"#,
        ))
        .mount(&server)
        .await;

    let client = ServiceClient::builder(ServiceId::new("queue").unwrap())
        .config(
            SdkConfig::builder()
                .endpoint_url(EndpointUrl::new(server.uri()).unwrap())
                .max_attempts(1)
                .build(),
        )
        .credentials_provider(test_credentials())
        .build()
        .unwrap();

    let outcome = client
        .call(Request::new(&CREATE_QUEUE).with("QueueName", "jobs"))
        .await;

    let SdkError::Service(error) = outcome.error() else {
        panic!("expected a service error");
    };
    assert_eq!(error.http_status, 503);
    assert!(error.retryable);
    assert!(outcome.error().is_retryable());
}
