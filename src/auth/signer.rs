//! Request signing.
//!
//! The signing scheme here is deliberately small: an HMAC-SHA256 over a
//! canonical request string, carried in an `Authorization` header alongside
//! an `X-Nimbus-Date` header. The canonical string covers the method, path,
//! sorted query pairs, the date, and a digest of the body, so replaying a
//! signature against a different request fails verification.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::auth::Credentials;

type HmacSha256 = Hmac<Sha256>;

/// Scheme label emitted in the `Authorization` header.
pub const SIGNING_SCHEME: &str = "NIMBUS1-HMAC-SHA256";

/// Header carrying the signing timestamp.
pub const DATE_HEADER: &str = "X-Nimbus-Date";

const DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Errors raised while signing a request.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("invalid signing key: {message}")]
    InvalidKey { message: String },
}

/// The request parts covered by a signature.
#[derive(Debug, Clone, Copy)]
pub struct SigningContext<'a> {
    pub method: &'a str,
    pub path: &'a str,
    pub query: &'a [(String, String)],
    pub body: Option<&'a str>,
    pub timestamp: DateTime<Utc>,
}

/// Produces authentication headers for an outgoing request.
pub trait Signer: Send + Sync {
    /// Returns the header pairs to attach to the request.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError`] if the credentials cannot be used as a
    /// signing key.
    fn sign(
        &self,
        context: &SigningContext<'_>,
        credentials: &Credentials,
    ) -> Result<Vec<(String, String)>, SigningError>;
}

/// The default HMAC-SHA256 signer.
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacSigner;

impl HmacSigner {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn canonical_string(context: &SigningContext<'_>, date: &str) -> String {
        let mut query: Vec<&(String, String)> = context.query.iter().collect();
        query.sort();
        let canonical_query = query
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        let body_digest = BASE64.encode(Sha256::digest(context.body.unwrap_or("").as_bytes()));
        format!(
            "{}\n{}\n{}\n{}\n{}",
            context.method, context.path, canonical_query, date, body_digest
        )
    }
}

impl Signer for HmacSigner {
    fn sign(
        &self,
        context: &SigningContext<'_>,
        credentials: &Credentials,
    ) -> Result<Vec<(String, String)>, SigningError> {
        let date = context.timestamp.format(DATE_FORMAT).to_string();
        let canonical = Self::canonical_string(context, &date);

        let mut mac = HmacSha256::new_from_slice(credentials.secret_access_key().as_bytes())
            .map_err(|e| SigningError::InvalidKey {
                message: e.to_string(),
            })?;
        mac.update(canonical.as_bytes());
        let signature = BASE64.encode(mac.finalize().into_bytes());

        Ok(vec![
            (DATE_HEADER.to_string(), date),
            (
                "Authorization".to_string(),
                format!(
                    "{SIGNING_SCHEME} Credential={}, Signature={signature}",
                    credentials.access_key_id()
                ),
            ),
        ])
    }
}
