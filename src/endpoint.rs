//! Endpoint resolution.
//!
//! An [`EndpointProvider`] turns the call context (service, region, optional
//! operation host prefix) into the base URL the transport connects to.
//! Resolution happens before any bytes leave the process; a failure here is
//! a pre-flight error, not a transport error.

use crate::config::{EndpointUrl, Region, ServiceId};

/// Default DNS suffix for regional endpoints.
pub const DEFAULT_DNS_SUFFIX: &str = "nimbus.cloud";

/// Errors raised during endpoint resolution.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error("no region configured for service '{service}'")]
    MissingRegion { service: String },

    #[error("resolved endpoint is not a valid URL: {url}")]
    InvalidEndpoint { url: String },
}

/// A resolved base URL, scheme and host only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    url: String,
}

impl Endpoint {
    #[must_use]
    pub const fn new(url: String) -> Self {
        Self { url }
    }

    /// The base URL without a trailing slash.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// The information available when resolving an endpoint for one call.
#[derive(Debug, Clone, Copy)]
pub struct EndpointContext<'a> {
    pub service: &'a ServiceId,
    pub region: Option<&'a Region>,
    /// Resolved host prefix from the operation, e.g. `"jobs."`.
    pub host_prefix: Option<&'a str>,
}

/// Maps a call context to a concrete endpoint.
pub trait EndpointProvider: Send + Sync {
    /// # Errors
    ///
    /// Returns [`EndpointError`] when the context is insufficient to name a
    /// host.
    fn resolve(&self, context: &EndpointContext<'_>) -> Result<Endpoint, EndpointError>;
}

/// Always resolves to a fixed URL, e.g. a local emulator.
///
/// Host prefixes still apply so prefixed operations keep working against
/// overridden endpoints.
#[derive(Debug, Clone)]
pub struct StaticEndpointProvider {
    endpoint: EndpointUrl,
}

impl StaticEndpointProvider {
    #[must_use]
    pub const fn new(endpoint: EndpointUrl) -> Self {
        Self { endpoint }
    }
}

impl EndpointProvider for StaticEndpointProvider {
    fn resolve(&self, context: &EndpointContext<'_>) -> Result<Endpoint, EndpointError> {
        let url = match context.host_prefix {
            Some(prefix) => apply_host_prefix(self.endpoint.as_ref(), prefix)?,
            None => self.endpoint.as_ref().to_string(),
        };
        Ok(Endpoint::new(url))
    }
}

/// Builds `https://{service}.{region}.{dns suffix}` endpoints.
#[derive(Debug, Clone)]
pub struct RegionEndpointProvider {
    dns_suffix: String,
}

impl RegionEndpointProvider {
    #[must_use]
    pub fn new() -> Self {
        Self {
            dns_suffix: DEFAULT_DNS_SUFFIX.to_string(),
        }
    }

    #[must_use]
    pub fn with_dns_suffix(dns_suffix: impl Into<String>) -> Self {
        Self {
            dns_suffix: dns_suffix.into(),
        }
    }
}

impl Default for RegionEndpointProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl EndpointProvider for RegionEndpointProvider {
    fn resolve(&self, context: &EndpointContext<'_>) -> Result<Endpoint, EndpointError> {
        let region = context.region.ok_or_else(|| EndpointError::MissingRegion {
            service: context.service.to_string(),
        })?;
        let prefix = context.host_prefix.unwrap_or("");
        Ok(Endpoint::new(format!(
            "https://{prefix}{}.{region}.{}",
            context.service, self.dns_suffix
        )))
    }
}

/// Inserts a host prefix after the URL scheme.
fn apply_host_prefix(url: &str, prefix: &str) -> Result<String, EndpointError> {
    let scheme_end = url
        .find("://")
        .ok_or_else(|| EndpointError::InvalidEndpoint {
            url: url.to_string(),
        })?;
    let (scheme, host) = url.split_at(scheme_end + 3);
    Ok(format!("{scheme}{prefix}{host}"))
}
