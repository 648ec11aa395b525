//! Configuration types for the SDK client runtime.
//!
//! This module provides the core configuration types shared by every
//! per-service client built on this runtime.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`SdkConfig`]: The main configuration struct holding all client settings
//! - [`SdkConfigBuilder`]: A builder for constructing [`SdkConfig`] instances
//! - [`Region`]: A validated region identifier
//! - [`EndpointUrl`]: A validated endpoint URL override
//! - [`AccessKeyId`] / [`SecretAccessKey`]: Validated credential newtypes
//!   (the secret masks its debug output)
//!
//! # Example
//!
//! ```rust
//! use nimbus_sdk_core::{Region, SdkConfig};
//!
//! let config = SdkConfig::builder()
//!     .region(Region::new("us-east-1").unwrap())
//!     .user_agent_prefix("MyApp/1.0")
//!     .build();
//!
//! assert_eq!(config.region().unwrap().as_ref(), "us-east-1");
//! ```

mod newtypes;

pub use newtypes::{AccessKeyId, EndpointUrl, Region, SecretAccessKey, ServiceId};

use std::time::Duration;

/// Default number of transport attempts (1 initial try plus 2 retries).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default per-request transport timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration shared by service clients.
///
/// All fields are optional; clients fall back to documented defaults. The
/// config carries no credentials — those come from a credentials provider
/// collaborator so that discovery chains can refresh them independently.
///
/// # Thread Safety
///
/// `SdkConfig` is `Clone`, `Send`, and `Sync`, making it safe to share
/// across threads and async tasks.
#[derive(Clone, Debug)]
pub struct SdkConfig {
    region: Option<Region>,
    endpoint_url: Option<EndpointUrl>,
    user_agent_prefix: Option<String>,
    max_attempts: u32,
    request_timeout: Duration,
}

impl SdkConfig {
    /// Creates a new builder for constructing an `SdkConfig`.
    #[must_use]
    pub fn builder() -> SdkConfigBuilder {
        SdkConfigBuilder::new()
    }

    /// Returns the configured region, if any.
    #[must_use]
    pub const fn region(&self) -> Option<&Region> {
        self.region.as_ref()
    }

    /// Returns the endpoint URL override, if configured.
    ///
    /// When set, endpoint resolution uses this URL verbatim instead of
    /// deriving a host from the region and service id.
    #[must_use]
    pub const fn endpoint_url(&self) -> Option<&EndpointUrl> {
        self.endpoint_url.as_ref()
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns the maximum number of transport attempts per request.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the per-request transport timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

// Verify SdkConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SdkConfig>();
};

/// Builder for constructing [`SdkConfig`] instances.
///
/// # Defaults
///
/// - `region`: `None` (endpoint resolution requires an explicit endpoint URL)
/// - `endpoint_url`: `None`
/// - `user_agent_prefix`: `None`
/// - `max_attempts`: [`DEFAULT_MAX_ATTEMPTS`]
/// - `request_timeout`: [`DEFAULT_REQUEST_TIMEOUT`]
///
/// # Example
///
/// ```rust
/// use nimbus_sdk_core::{EndpointUrl, Region, SdkConfig};
/// use std::time::Duration;
///
/// let config = SdkConfig::builder()
///     .region(Region::new("eu-central-2").unwrap())
///     .endpoint_url(EndpointUrl::new("http://localhost:4566").unwrap())
///     .max_attempts(5)
///     .request_timeout(Duration::from_secs(10))
///     .build();
/// ```
#[derive(Debug, Default)]
pub struct SdkConfigBuilder {
    region: Option<Region>,
    endpoint_url: Option<EndpointUrl>,
    user_agent_prefix: Option<String>,
    max_attempts: Option<u32>,
    request_timeout: Option<Duration>,
}

impl SdkConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the region.
    #[must_use]
    pub fn region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    /// Sets an explicit endpoint URL, bypassing region-based resolution.
    #[must_use]
    pub fn endpoint_url(mut self, url: EndpointUrl) -> Self {
        self.endpoint_url = Some(url);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Sets the maximum number of transport attempts per request.
    ///
    /// A value of 1 disables transport-level retries.
    #[must_use]
    pub const fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Sets the per-request transport timeout.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Builds the [`SdkConfig`].
    ///
    /// Every field is optional, so building never fails; validation happens
    /// at newtype construction time.
    #[must_use]
    pub fn build(self) -> SdkConfig {
        SdkConfig {
            region: self.region,
            endpoint_url: self.endpoint_url,
            user_agent_prefix: self.user_agent_prefix,
            max_attempts: self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS).max(1),
            request_timeout: self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_provides_sensible_defaults() {
        let config = SdkConfig::builder().build();

        assert!(config.region().is_none());
        assert!(config.endpoint_url().is_none());
        assert!(config.user_agent_prefix().is_none());
        assert_eq!(config.max_attempts(), DEFAULT_MAX_ATTEMPTS);
        assert_eq!(config.request_timeout(), DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn test_builder_with_all_fields() {
        let config = SdkConfig::builder()
            .region(Region::new("us-east-1").unwrap())
            .endpoint_url(EndpointUrl::new("http://localhost:4566").unwrap())
            .user_agent_prefix("TestApp/1.0")
            .max_attempts(5)
            .request_timeout(Duration::from_secs(5))
            .build();

        assert_eq!(config.region().unwrap().as_ref(), "us-east-1");
        assert_eq!(
            config.endpoint_url().unwrap().as_ref(),
            "http://localhost:4566"
        );
        assert_eq!(config.user_agent_prefix(), Some("TestApp/1.0"));
        assert_eq!(config.max_attempts(), 5);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_max_attempts_is_clamped_to_at_least_one() {
        let config = SdkConfig::builder().max_attempts(0).build();
        assert_eq!(config.max_attempts(), 1);
    }

    #[test]
    fn test_config_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SdkConfig>();
    }

    #[test]
    fn test_config_is_clone_and_debug() {
        let config = SdkConfig::builder()
            .region(Region::new("us-east-1").unwrap())
            .build();

        let cloned = config.clone();
        assert_eq!(cloned.region(), config.region());

        let debug_str = format!("{config:?}");
        assert!(debug_str.contains("SdkConfig"));
    }
}
