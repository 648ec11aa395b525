//! The service client and its dispatch pipeline.
//!
//! A [`ServiceClient`] is a cheap-clone handle over immutable collaborators:
//! config, credentials provider, signer, endpoint provider, transport, and
//! executor. One instance serves any number of concurrent calls; there is no
//! per-call shared mutable state to contend over.
//!
//! Dispatch is a fixed pipeline: resolve the endpoint, serialize the
//! request, fetch credentials and sign, hand the raw request to the
//! transport, and wrap whatever comes back in an [`Outcome`]. The dispatcher
//! itself never retries (the transport owns that) and never panics for
//! ordinary failures.

pub mod marshal;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use chrono::Utc;
use tokio::sync::oneshot;

use crate::auth::{
    ChainCredentialsProvider, CredentialsProvider, EnvCredentialsProvider, HmacSigner, Signer,
    SigningContext,
};
use crate::config::{SdkConfig, ServiceId};
use crate::endpoint::{
    EndpointContext, EndpointProvider, RegionEndpointProvider, StaticEndpointProvider,
};
use crate::executor::{Executor, TokioExecutor};
use crate::outcome::{Outcome, SdkError};
use crate::request::Request;
use crate::shape::Shape;
use crate::transport::{HttpTransport, RawRequest, Transport};
use crate::wire::{json, xml, WireProtocol};

/// A handle to one service, safe to clone and share across tasks.
///
/// # Example
///
/// ```rust,ignore
/// let client = ServiceClient::builder(ServiceId::new("queue")?)
///     .config(SdkConfig::builder().region(Region::new("us-east-1")?).build())
///     .credentials_provider(StaticCredentialsProvider::new(credentials))
///     .build()?;
///
/// let outcome = client.call(Request::new(&CREATE_QUEUE).with("QueueName", "jobs")).await;
/// ```
#[derive(Clone)]
pub struct ServiceClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    service: ServiceId,
    config: SdkConfig,
    credentials_provider: Box<dyn CredentialsProvider>,
    signer: Box<dyn Signer>,
    endpoint_provider: Option<Box<dyn EndpointProvider>>,
    transport: Box<dyn Transport>,
    executor: Box<dyn Executor>,
}

// Verify ServiceClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ServiceClient>();
};

impl ServiceClient {
    /// Creates a new builder for the given service.
    #[must_use]
    pub fn builder(service: ServiceId) -> ServiceClientBuilder {
        ServiceClientBuilder::new(service)
    }

    /// Returns the service this client talks to.
    #[must_use]
    pub fn service(&self) -> &ServiceId {
        &self.inner.service
    }

    /// Returns the shared config.
    #[must_use]
    pub fn config(&self) -> &SdkConfig {
        &self.inner.config
    }

    /// Dispatches one call and awaits its outcome in place.
    pub async fn call(&self, request: Request) -> Outcome<Shape> {
        self.inner.dispatch(request).await.into()
    }

    /// Dispatches one call on the executor and returns a future of its
    /// outcome.
    ///
    /// The call starts immediately; the returned [`PendingOutcome`] can be
    /// awaited later or dropped to abandon interest in the result. Dropping
    /// it does not cancel the in-flight request.
    #[must_use]
    pub fn call_callable(&self, request: Request) -> PendingOutcome {
        let (sender, receiver) = oneshot::channel();
        let client = self.clone();
        self.inner.executor.spawn(Box::pin(async move {
            let outcome = client.call(request).await;
            // The receiver may have been dropped; the outcome is discarded.
            let _ = sender.send(outcome);
        }));
        PendingOutcome { receiver }
    }

    /// Dispatches one call on the executor and invokes `handler` with the
    /// outcome when it completes.
    pub fn call_with_handler<F>(&self, request: Request, handler: F)
    where
        F: FnOnce(Outcome<Shape>) + Send + 'static,
    {
        let client = self.clone();
        self.inner.executor.spawn(Box::pin(async move {
            handler(client.call(request).await);
        }));
    }
}

impl std::fmt::Debug for ServiceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceClient")
            .field("service", &self.inner.service)
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl ClientInner {
    async fn dispatch(&self, request: Request) -> Result<Shape, SdkError> {
        let operation = request.operation();
        tracing::debug!(
            operation = operation.name,
            service = %self.service,
            "dispatching request"
        );

        // Step 1: endpoint resolution, before any serialization or I/O.
        let Some(endpoint_provider) = &self.endpoint_provider else {
            return Err(SdkError::EndpointResolution {
                message: format!(
                    "no endpoint available for service '{}': configure a region or an endpoint URL",
                    self.service
                ),
            });
        };
        let host_prefix = request.resolve_host_prefix()?;
        let endpoint = endpoint_provider
            .resolve(&EndpointContext {
                service: &self.service,
                region: self.config.region(),
                host_prefix: host_prefix.as_deref(),
            })
            .map_err(|e| SdkError::EndpointResolution {
                message: e.to_string(),
            })?;
        tracing::debug!(endpoint = endpoint.url(), "resolved endpoint");

        // Step 2: serialize.
        let payload = request.serialize()?;

        // Step 3: credentials and signature.
        let credentials = self
            .credentials_provider
            .provide_credentials()
            .await
            .map_err(|e| SdkError::Transport {
                message: format!("credential discovery failed: {e}"),
                retryable: false,
            })?;
        let signing_context = SigningContext {
            method: operation.method.as_str(),
            path: &payload.path,
            query: &payload.query,
            body: payload.body.as_deref(),
            timestamp: Utc::now(),
        };
        let mut headers = payload.headers;
        headers.extend(self.signer.sign(&signing_context, &credentials).map_err(
            |e| SdkError::Transport {
                message: format!("signing failed: {e}"),
                retryable: false,
            },
        )?);

        // Step 4: transport.
        let raw = RawRequest {
            method: operation.method,
            url: format!("{}{}", endpoint.url(), payload.path),
            query: payload.query,
            headers,
            body: payload.body,
            content_type: payload.content_type,
        };
        let response = self
            .transport
            .dispatch(raw)
            .await
            .map_err(|e| SdkError::Transport {
                message: e.message,
                retryable: e.retryable,
            })?;

        // Step 5: wrap.
        if response.is_success() {
            let output = deserialize_output(&response.body, operation.protocol, operation.output)?;
            return Ok(output);
        }
        let error = marshal::service_error(&response, operation.protocol);
        tracing::warn!(
            operation = operation.name,
            code = %error.code,
            status = error.http_status,
            "service returned an error"
        );
        Err(SdkError::Service(error))
    }
}

fn deserialize_output(
    body: &str,
    protocol: WireProtocol,
    schema: &'static crate::shape::ShapeSchema,
) -> Result<Shape, SdkError> {
    if body.trim().is_empty() {
        return Ok(Shape::new());
    }
    let shape = match protocol {
        WireProtocol::Json => {
            let value = serde_json::from_str(body).map_err(|e| {
                crate::wire::WireError::MalformedDocument {
                    protocol: "JSON",
                    message: e.to_string(),
                }
            })?;
            json::deserialize_body(&value, schema)?
        }
        // Query-protocol services answer in XML.
        WireProtocol::Xml | WireProtocol::Query => xml::deserialize_body(body, schema)?,
    };
    Ok(shape)
}

/// A future of one call's outcome, backed by a oneshot channel.
///
/// Resolves to a transport failure if the executing task is dropped before
/// it can deliver an outcome.
#[derive(Debug)]
pub struct PendingOutcome {
    receiver: oneshot::Receiver<Outcome<Shape>>,
}

impl Future for PendingOutcome {
    type Output = Outcome<Shape>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver).poll(cx).map(|result| {
            result.unwrap_or_else(|_| {
                Outcome::Failure(SdkError::Transport {
                    message: "call task was dropped before completion".to_string(),
                    retryable: false,
                })
            })
        })
    }
}

/// Builder for [`ServiceClient`].
///
/// # Defaults
///
/// - `config`: [`SdkConfig::default`]
/// - `credentials_provider`: environment discovery
/// - `signer`: [`HmacSigner`]
/// - `endpoint_provider`: derived from the config (explicit endpoint URL,
///   else region-based, else none)
/// - `transport`: [`HttpTransport`]
/// - `executor`: [`TokioExecutor`]
pub struct ServiceClientBuilder {
    service: ServiceId,
    config: Option<SdkConfig>,
    credentials_provider: Option<Box<dyn CredentialsProvider>>,
    signer: Option<Box<dyn Signer>>,
    endpoint_provider: Option<Box<dyn EndpointProvider>>,
    transport: Option<Box<dyn Transport>>,
    executor: Option<Box<dyn Executor>>,
}

impl ServiceClientBuilder {
    #[must_use]
    pub fn new(service: ServiceId) -> Self {
        Self {
            service,
            config: None,
            credentials_provider: None,
            signer: None,
            endpoint_provider: None,
            transport: None,
            executor: None,
        }
    }

    #[must_use]
    pub fn config(mut self, config: SdkConfig) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn credentials_provider(mut self, provider: impl CredentialsProvider + 'static) -> Self {
        self.credentials_provider = Some(Box::new(provider));
        self
    }

    #[must_use]
    pub fn signer(mut self, signer: impl Signer + 'static) -> Self {
        self.signer = Some(Box::new(signer));
        self
    }

    #[must_use]
    pub fn endpoint_provider(mut self, provider: impl EndpointProvider + 'static) -> Self {
        self.endpoint_provider = Some(Box::new(provider));
        self
    }

    #[must_use]
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    #[must_use]
    pub fn executor(mut self, executor: impl Executor + 'static) -> Self {
        self.executor = Some(Box::new(executor));
        self
    }

    /// Builds the client, filling unset collaborators with defaults.
    ///
    /// A client with neither a region nor an endpoint URL still builds; its
    /// calls fail with an endpoint resolution error without touching the
    /// transport.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::Transport`] if the default HTTP transport cannot
    /// be constructed.
    pub fn build(self) -> Result<ServiceClient, SdkError> {
        let config = self.config.unwrap_or_default();

        let endpoint_provider = self.endpoint_provider.or_else(|| {
            if let Some(url) = config.endpoint_url() {
                Some(Box::new(StaticEndpointProvider::new(url.clone())) as Box<dyn EndpointProvider>)
            } else if config.region().is_some() {
                Some(Box::new(RegionEndpointProvider::new()))
            } else {
                None
            }
        });

        let transport = match self.transport {
            Some(transport) => transport,
            None => Box::new(HttpTransport::new(&config).map_err(|e| SdkError::Transport {
                message: e.message,
                retryable: false,
            })?),
        };

        let credentials_provider = self.credentials_provider.unwrap_or_else(|| {
            Box::new(ChainCredentialsProvider::new().push(EnvCredentialsProvider::new()))
        });

        Ok(ServiceClient {
            inner: Arc::new(ClientInner {
                service: self.service,
                config,
                credentials_provider,
                signer: self.signer.unwrap_or_else(|| Box::new(HmacSigner::new())),
                endpoint_provider,
                transport,
                executor: self
                    .executor
                    .unwrap_or_else(|| Box::new(TokioExecutor::new())),
            }),
        })
    }
}
