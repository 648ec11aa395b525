//! Credential types and discovery providers.

use async_trait::async_trait;

use crate::config::{AccessKeyId, SecretAccessKey};
use crate::error::ConfigError;

/// Environment variables read by [`EnvCredentialsProvider`].
pub const ENV_ACCESS_KEY_ID: &str = "NIMBUS_ACCESS_KEY_ID";
pub const ENV_SECRET_ACCESS_KEY: &str = "NIMBUS_SECRET_ACCESS_KEY";

/// An access key pair used to sign requests.
///
/// The secret never appears in `Debug` output; [`SecretAccessKey`] masks
/// itself.
#[derive(Debug, Clone)]
pub struct Credentials {
    access_key_id: AccessKeyId,
    secret_access_key: SecretAccessKey,
}

impl Credentials {
    /// Builds credentials from raw key strings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if either key is empty.
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            access_key_id: AccessKeyId::new(access_key_id)?,
            secret_access_key: SecretAccessKey::new(secret_access_key)?,
        })
    }

    #[must_use]
    pub const fn from_keys(access_key_id: AccessKeyId, secret_access_key: SecretAccessKey) -> Self {
        Self {
            access_key_id,
            secret_access_key,
        }
    }

    #[must_use]
    pub fn access_key_id(&self) -> &str {
        self.access_key_id.as_ref()
    }

    #[must_use]
    pub fn secret_access_key(&self) -> &str {
        self.secret_access_key.as_ref()
    }
}

/// Errors raised while discovering credentials.
#[derive(Debug, thiserror::Error)]
pub enum CredentialsError {
    /// No provider in scope produced credentials.
    #[error("no credentials available: {message}")]
    NotDiscovered { message: String },

    /// Discovered material failed validation.
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// Source of credentials for the dispatcher.
///
/// Providers are consulted per call, which lets implementations rotate or
/// refresh material without client coordination.
#[async_trait]
pub trait CredentialsProvider: Send + Sync {
    async fn provide_credentials(&self) -> Result<Credentials, CredentialsError>;
}

/// Always returns the same fixed credentials.
#[derive(Debug, Clone)]
pub struct StaticCredentialsProvider {
    credentials: Credentials,
}

impl StaticCredentialsProvider {
    #[must_use]
    pub const fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

#[async_trait]
impl CredentialsProvider for StaticCredentialsProvider {
    async fn provide_credentials(&self) -> Result<Credentials, CredentialsError> {
        Ok(self.credentials.clone())
    }
}

/// Reads `NIMBUS_ACCESS_KEY_ID` / `NIMBUS_SECRET_ACCESS_KEY` from the
/// process environment on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentialsProvider;

impl EnvCredentialsProvider {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn read_var(name: &str) -> Result<String, CredentialsError> {
        std::env::var(name).map_err(|_| CredentialsError::NotDiscovered {
            message: format!("environment variable {name} is not set"),
        })
    }
}

#[async_trait]
impl CredentialsProvider for EnvCredentialsProvider {
    async fn provide_credentials(&self) -> Result<Credentials, CredentialsError> {
        let access_key_id = Self::read_var(ENV_ACCESS_KEY_ID)?;
        let secret_access_key = Self::read_var(ENV_SECRET_ACCESS_KEY)?;
        Ok(Credentials::new(access_key_id, secret_access_key)?)
    }
}

/// Consults providers in order and returns the first success.
#[derive(Default)]
pub struct ChainCredentialsProvider {
    providers: Vec<Box<dyn CredentialsProvider>>,
}

impl ChainCredentialsProvider {
    #[must_use]
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    #[must_use]
    pub fn push(mut self, provider: impl CredentialsProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }
}

#[async_trait]
impl CredentialsProvider for ChainCredentialsProvider {
    async fn provide_credentials(&self) -> Result<Credentials, CredentialsError> {
        let mut failures = Vec::new();
        for provider in &self.providers {
            match provider.provide_credentials().await {
                Ok(credentials) => return Ok(credentials),
                Err(error) => failures.push(error.to_string()),
            }
        }
        Err(CredentialsError::NotDiscovered {
            message: if failures.is_empty() {
                "credential chain is empty".to_string()
            } else {
                failures.join("; ")
            },
        })
    }
}
