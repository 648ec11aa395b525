//! # Nimbus SDK Core
//!
//! The client runtime shared by Nimbus service SDKs: schema-driven request
//! and response shapes, wire serializers, request signing, endpoint
//! resolution, and an async dispatch pipeline over HTTP.
//!
//! ## Overview
//!
//! This runtime provides:
//! - A generic [`Shape`] data model with per-field has-been-set tracking
//! - Const [`ShapeSchema`]/[`OperationSchema`] tables describing each API
//! - Deterministic JSON, XML, and query-string wire serialization
//! - An [`Outcome`] success/error union with a small error taxonomy
//! - A concurrent-safe [`ServiceClient`] with pluggable credentials,
//!   signing, endpoint resolution, transport, and executor seams
//!
//! Service SDKs built on this crate declare their operations as const
//! schemas; no per-operation request or response structs are generated.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use nimbus_sdk_core::{
//!     Credentials, Region, Request, SdkConfig, ServiceClient, ServiceId,
//!     StaticCredentialsProvider,
//! };
//!
//! let client = ServiceClient::builder(ServiceId::new("queue")?)
//!     .config(
//!         SdkConfig::builder()
//!             .region(Region::new("us-east-1")?)
//!             .build(),
//!     )
//!     .credentials_provider(StaticCredentialsProvider::new(Credentials::new(
//!         "access-key-id",
//!         "secret-access-key",
//!     )?))
//!     .build()?;
//!
//! let request = Request::new(&CREATE_QUEUE)
//!     .with("QueueName", "jobs")
//!     .with("DelaySeconds", 30_i64);
//!
//! let outcome = client.call(request).await;
//! if outcome.is_success() {
//!     println!("queue url: {}", outcome.result().str_field("QueueUrl"));
//! }
//! ```
//!
//! ## Calling Conventions
//!
//! All three conventions share one dispatch pipeline:
//!
//! ```rust,ignore
//! // Await in place.
//! let outcome = client.call(request.clone()).await;
//!
//! // Start now, await later.
//! let pending = client.call_callable(request.clone());
//! let outcome = pending.await;
//!
//! // Completion handler on the executor.
//! client.call_with_handler(request, |outcome| {
//!     println!("done: {}", outcome.is_success());
//! });
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: Configuration is instance-based and passed explicitly
//! - **Fail-fast validation**: All newtypes validate on construction
//! - **Thread-safe**: Clients are `Send + Sync` and cheap to clone
//! - **Async-first**: Designed for use with the Tokio async runtime
//! - **Errors as values**: Every dispatch returns an [`Outcome`]; ordinary
//!   failures never panic

pub mod auth;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod executor;
pub mod outcome;
pub mod request;
pub mod shape;
pub mod transport;
pub mod wire;

// Re-export public types at crate root for convenience
pub use config::{
    AccessKeyId, EndpointUrl, Region, SdkConfig, SdkConfigBuilder, SecretAccessKey, ServiceId,
};
pub use error::ConfigError;
pub use outcome::{Outcome, SdkError, ServiceError};
pub use shape::{FieldBinding, FieldKind, FieldSchema, FieldValue, Shape, ShapeSchema};

// Re-export the request/dispatch surface
pub use client::{PendingOutcome, ServiceClient, ServiceClientBuilder};
pub use request::{HttpMethod, OperationSchema, Request, RequestPayload};
pub use wire::{WireError, WireProtocol};

// Re-export the collaborator seams
pub use auth::{
    ChainCredentialsProvider, Credentials, CredentialsProvider, EnvCredentialsProvider, HmacSigner,
    Signer, StaticCredentialsProvider,
};
pub use endpoint::{
    Endpoint, EndpointContext, EndpointError, EndpointProvider, RegionEndpointProvider,
    StaticEndpointProvider,
};
pub use executor::{Executor, TokioExecutor};
pub use transport::{HttpTransport, RawRequest, RawResponse, Transport, TransportError};
