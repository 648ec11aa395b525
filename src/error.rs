//! Error types for SDK configuration.
//!
//! This module contains error types used for configuration and newtype
//! validation errors.
//!
//! # Error Handling
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation. Error messages are designed to be clear and actionable.
//!
//! # Example
//!
//! ```rust
//! use nimbus_sdk_core::{AccessKeyId, ConfigError};
//!
//! let result = AccessKeyId::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyAccessKeyId)));
//! ```

use thiserror::Error;

/// Errors that can occur during SDK configuration.
///
/// This enum represents all possible errors that can occur when creating
/// or validating configuration types. Each variant provides a clear,
/// actionable error message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Access key ID cannot be empty.
    #[error("Access key ID cannot be empty. Please provide a valid access key ID.")]
    EmptyAccessKeyId,

    /// Secret access key cannot be empty.
    #[error("Secret access key cannot be empty. Please provide a valid secret access key.")]
    EmptySecretAccessKey,

    /// Region is invalid.
    #[error("Invalid region '{region}'. Expected a lowercase identifier like 'us-east-1'.")]
    InvalidRegion {
        /// The invalid region that was provided.
        region: String,
    },

    /// Endpoint URL is invalid.
    #[error("Invalid endpoint URL '{url}'. Expected an absolute http:// or https:// URL.")]
    InvalidEndpointUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// Service identifier is invalid.
    #[error("Invalid service id '{service}'. Expected a non-empty lowercase identifier.")]
    InvalidServiceId {
        /// The invalid service id that was provided.
        service: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_are_actionable() {
        assert!(ConfigError::EmptyAccessKeyId
            .to_string()
            .contains("access key ID"));
        assert!(ConfigError::EmptySecretAccessKey
            .to_string()
            .contains("secret access key"));

        let err = ConfigError::InvalidRegion {
            region: "US EAST".to_string(),
        };
        assert!(err.to_string().contains("US EAST"));

        let err = ConfigError::InvalidEndpointUrl {
            url: "ftp://nope".to_string(),
        };
        assert!(err.to_string().contains("ftp://nope"));
    }

    #[test]
    fn test_config_error_is_clone_and_eq() {
        let err = ConfigError::EmptyAccessKeyId;
        assert_eq!(err.clone(), err);
    }
}
