//! HTTP transport on `reqwest` with transport-level retries.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::SdkConfig;
use crate::request::HttpMethod;
use crate::transport::{RawRequest, RawResponse, Transport, TransportError};

/// Fixed fallback retry wait time in seconds when the service sends no
/// `Retry-After` hint.
pub const RETRY_WAIT_TIME: u64 = 1;

/// SDK version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// The default [`Transport`]: `reqwest` with rustls, a per-request timeout,
/// and automatic retries for 429 and 5xx responses.
///
/// Retrying lives here, below the dispatcher. A response that survives the
/// retry loop is returned as-is, whatever its status; only the absence of
/// any HTTP response becomes a [`TransportError`].
///
/// # Thread Safety
///
/// `HttpTransport` is `Send + Sync`, making it safe to share across async
/// tasks.
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    user_agent: String,
    max_attempts: u32,
}

// Verify HttpTransport is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpTransport>();
};

impl HttpTransport {
    /// Creates a transport from the shared config.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the underlying TLS-backed client cannot
    /// be constructed.
    pub fn new(config: &SdkConfig) -> Result<Self, TransportError> {
        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        let user_agent =
            format!("{user_agent_prefix}Nimbus SDK v{SDK_VERSION} | Rust {rust_version}");

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| TransportError::fatal(e.to_string()))?;

        Ok(Self {
            client,
            user_agent,
            max_attempts: config.max_attempts(),
        })
    }

    /// Returns the User-Agent sent with every request.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    async fn attempt(&self, request: &RawRequest) -> Result<RawResponse, TransportError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
            HttpMethod::Put => self.client.put(&request.url),
            HttpMethod::Delete => self.client.delete(&request.url),
            HttpMethod::Patch => self.client.patch(&request.url),
            HttpMethod::Head => self.client.head(&request.url),
        };

        builder = builder.header("User-Agent", &self.user_agent);
        if let Some(content_type) = request.content_type {
            builder = builder.header("Content-Type", content_type);
        }
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(classify_reqwest_error)?;

        let status = response.status().as_u16();
        let headers = parse_response_headers(response.headers());
        let body = response.text().await.unwrap_or_default();

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn dispatch(&self, request: RawRequest) -> Result<RawResponse, TransportError> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;

            let result = self.attempt(&request).await;
            let retryable = match &result {
                Ok(response) => response.status == 429 || response.status >= 500,
                Err(error) => error.retryable,
            };
            if !retryable || attempt >= self.max_attempts {
                return result;
            }

            let delay = result
                .as_ref()
                .ok()
                .map_or_else(|| Duration::from_secs(RETRY_WAIT_TIME), retry_delay);
            tracing::warn!(
                url = %request.url,
                attempt,
                max_attempts = self.max_attempts,
                delay_secs = delay.as_secs_f64(),
                "retrying request after retryable failure"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

/// Picks the retry delay: `Retry-After` for 429 when present, otherwise a
/// fixed wait.
fn retry_delay(response: &RawResponse) -> Duration {
    if response.status == 429 {
        if let Some(retry_after) = response
            .header("Retry-After")
            .and_then(|v| v.parse::<f64>().ok())
        {
            return Duration::from_secs_f64(retry_after);
        }
    }
    Duration::from_secs(RETRY_WAIT_TIME)
}

fn classify_reqwest_error(error: reqwest::Error) -> TransportError {
    let retryable = error.is_timeout() || error.is_connect();
    TransportError {
        message: error.to_string(),
        retryable,
    }
}

fn parse_response_headers(headers: &reqwest::header::HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or_default().to_string(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_format() {
        let transport = HttpTransport::new(&SdkConfig::default()).unwrap();
        assert!(transport.user_agent().contains("Nimbus SDK v"));
        assert!(transport.user_agent().contains("Rust"));
    }

    #[test]
    fn test_user_agent_with_prefix() {
        let config = SdkConfig::builder().user_agent_prefix("MyApp/1.0").build();
        let transport = HttpTransport::new(&config).unwrap();
        assert!(transport.user_agent().starts_with("MyApp/1.0 | "));
    }

    #[test]
    fn test_retry_delay_honors_retry_after_on_429() {
        let response = RawResponse {
            status: 429,
            headers: vec![("retry-after".to_string(), "2.5".to_string())],
            body: String::new(),
        };
        assert_eq!(retry_delay(&response), Duration::from_secs_f64(2.5));
    }

    #[test]
    fn test_retry_delay_ignores_retry_after_on_500() {
        let response = RawResponse {
            status: 500,
            headers: vec![("retry-after".to_string(), "30".to_string())],
            body: String::new(),
        };
        assert_eq!(retry_delay(&response), Duration::from_secs(RETRY_WAIT_TIME));
    }

    #[test]
    fn test_transport_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HttpTransport>();
    }
}
