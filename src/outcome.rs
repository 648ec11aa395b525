//! The success/error union returned by every dispatch.
//!
//! An [`Outcome`] holds exactly one of a result value or an [`SdkError`],
//! enforced by the enum itself rather than by convention. Ordinary failures
//! (network trouble, a service error response, bad input serialization) are
//! always delivered as error outcomes; the dispatcher does not panic for
//! them.

use crate::wire::WireError;

/// The result of one dispatched call: a value or an error, never both.
#[derive(Debug)]
pub enum Outcome<T> {
    Success(T),
    Failure(SdkError),
}

impl<T> Outcome<T> {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the success value.
    ///
    /// # Panics
    ///
    /// Panics if the outcome is a failure. Accessing the wrong variant is a
    /// programmer error; callers are expected to check [`Self::is_success`]
    /// or use [`Self::into_result`] instead.
    #[must_use]
    pub fn result(&self) -> &T {
        match self {
            Self::Success(value) => value,
            Self::Failure(error) => panic!("called result() on a failure outcome: {error}"),
        }
    }

    /// Returns the error.
    ///
    /// # Panics
    ///
    /// Panics if the outcome is a success.
    #[must_use]
    pub fn error(&self) -> &SdkError {
        match self {
            Self::Success(_) => panic!("called error() on a success outcome"),
            Self::Failure(error) => error,
        }
    }

    #[must_use]
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure(_) => None,
        }
    }

    #[must_use]
    pub fn err(self) -> Option<SdkError> {
        match self {
            Self::Success(_) => None,
            Self::Failure(error) => Some(error),
        }
    }

    /// Converts into a standard `Result` for `?`-style consumption.
    ///
    /// # Errors
    ///
    /// Returns the [`SdkError`] when the outcome is a failure.
    pub fn into_result(self) -> Result<T, SdkError> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure(error) => Err(error),
        }
    }
}

impl<T> From<Result<T, SdkError>> for Outcome<T> {
    fn from(result: Result<T, SdkError>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(error) => Self::Failure(error),
        }
    }
}

/// Everything that can go wrong with a dispatched call.
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    /// No endpoint could be determined before any bytes were sent.
    #[error("endpoint resolution failed: {message}")]
    EndpointResolution { message: String },

    /// The request or response could not be rendered on the wire.
    #[error("serialization failed: {0}")]
    Serialization(#[from] WireError),

    /// The request never produced an HTTP response.
    #[error("transport failure: {message}")]
    Transport { message: String, retryable: bool },

    /// The service answered with a non-2xx response.
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl SdkError {
    /// Whether a fresh attempt of the same call could plausibly succeed.
    ///
    /// Endpoint resolution and serialization failures are deterministic and
    /// never retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::EndpointResolution { .. } | Self::Serialization(_) => false,
            Self::Transport { retryable, .. } => *retryable,
            Self::Service(error) => error.retryable,
        }
    }
}

/// A modeled error response from the service.
#[derive(Debug, Clone, thiserror::Error)]
#[error("service error {code} (HTTP {http_status}): {message}")]
pub struct ServiceError {
    /// Machine-readable error code, e.g. `"QueueDoesNotExist"`.
    pub code: String,
    pub message: String,
    pub http_status: u16,
    pub retryable: bool,
    /// Request id echoed by the service, when present.
    pub request_id: Option<String>,
}
