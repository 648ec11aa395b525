//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use std::fmt;

/// A validated access key ID.
///
/// This newtype ensures the access key ID is non-empty and provides type
/// safety to prevent accidental misuse of raw strings.
///
/// # Example
///
/// ```rust
/// use nimbus_sdk_core::AccessKeyId;
///
/// let key = AccessKeyId::new("NIMAKIDEXAMPLE").unwrap();
/// assert_eq!(key.as_ref(), "NIMAKIDEXAMPLE");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessKeyId(String);

impl AccessKeyId {
    /// Creates a new validated access key ID.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyAccessKeyId`] if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ConfigError::EmptyAccessKeyId);
        }
        Ok(Self(key))
    }
}

impl AsRef<str> for AccessKeyId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated secret access key.
///
/// This newtype ensures the secret is non-empty and masks its value
/// in debug output to prevent accidental exposure in logs.
///
/// # Security
///
/// The `Debug` implementation masks the secret value, displaying only
/// `SecretAccessKey(*****)` instead of the actual key.
///
/// # Example
///
/// ```rust
/// use nimbus_sdk_core::SecretAccessKey;
///
/// let secret = SecretAccessKey::new("my-secret").unwrap();
/// assert_eq!(format!("{:?}", secret), "SecretAccessKey(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct SecretAccessKey(String);

impl SecretAccessKey {
    /// Creates a new validated secret access key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptySecretAccessKey`] if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ConfigError::EmptySecretAccessKey);
        }
        Ok(Self(key))
    }
}

impl AsRef<str> for SecretAccessKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretAccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretAccessKey(*****)")
    }
}

/// A validated region identifier.
///
/// Regions are lowercase identifiers made of letters, digits, and hyphens,
/// for example `us-east-1` or `eu-central-2`.
///
/// # Example
///
/// ```rust
/// use nimbus_sdk_core::Region;
///
/// let region = Region::new("us-east-1").unwrap();
/// assert_eq!(region.as_ref(), "us-east-1");
///
/// // Whitespace and uppercase are rejected
/// assert!(Region::new("US EAST").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region(String);

impl Region {
    /// Creates a new validated region.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRegion`] if the region is empty or
    /// contains characters other than lowercase letters, digits, and hyphens.
    pub fn new(region: impl Into<String>) -> Result<Self, ConfigError> {
        let region = region.into();
        let valid = !region.is_empty()
            && region
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !valid {
            return Err(ConfigError::InvalidRegion { region });
        }
        Ok(Self(region))
    }
}

impl AsRef<str> for Region {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated endpoint URL override.
///
/// Must be an absolute `http://` or `https://` URL. A trailing slash is
/// stripped so paths can be appended uniformly.
///
/// # Example
///
/// ```rust
/// use nimbus_sdk_core::EndpointUrl;
///
/// let url = EndpointUrl::new("https://queue.local.test:4566/").unwrap();
/// assert_eq!(url.as_ref(), "https://queue.local.test:4566");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointUrl(String);

impl EndpointUrl {
    /// Creates a new validated endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEndpointUrl`] if the URL does not start
    /// with `http://` or `https://` or has no host part.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let rest = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"));
        match rest {
            Some(host) if !host.is_empty() && !host.starts_with('/') => {
                Ok(Self(url.trim_end_matches('/').to_string()))
            }
            _ => Err(ConfigError::InvalidEndpointUrl { url }),
        }
    }
}

impl AsRef<str> for EndpointUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated service identifier.
///
/// Service ids name the endpoint subdomain of a service, for example
/// `queue` or `blobstore`. They are lowercase identifiers made of letters,
/// digits, and hyphens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceId(String);

impl ServiceId {
    /// Creates a new validated service id.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidServiceId`] if the id is empty or
    /// contains characters other than lowercase letters, digits, and hyphens.
    pub fn new(service: impl Into<String>) -> Result<Self, ConfigError> {
        let service = service.into();
        let valid = !service.is_empty()
            && service
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !valid {
            return Err(ConfigError::InvalidServiceId { service });
        }
        Ok(Self(service))
    }
}

impl AsRef<str> for ServiceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
