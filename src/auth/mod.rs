//! Credential discovery and request signing.

mod credentials;
mod signer;

pub use credentials::{
    ChainCredentialsProvider, Credentials, CredentialsError, CredentialsProvider,
    EnvCredentialsProvider, StaticCredentialsProvider,
};
pub use signer::{HmacSigner, Signer, SigningContext, SigningError};
