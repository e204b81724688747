//! Reqwest transport - Implements TransportPort over a pooled HTTP client

use std::error::Error as StdError;
use std::time::Duration;

use application::error::ApplicationError;
use application::ports::{ProxyRequest, ProxyResponse, TransportError, TransportPort};
use async_trait::async_trait;
use http::Version;
use reqwest::{Client, redirect};
use tracing::{debug, instrument};

/// Configuration for the outbound HTTP client
#[derive(Debug, Clone)]
pub struct ReqwestTransportConfig {
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Whole-request timeout, including reading the response body
    pub timeout: Duration,
    /// Idle connections kept per destination host
    pub pool_max_idle_per_host: usize,
}

impl Default for ReqwestTransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(30),
            pool_max_idle_per_host: 32,
        }
    }
}

impl ReqwestTransportConfig {
    /// Set the request timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connection timeout
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

/// Default underlying transport for the proxy
///
/// Sends requests exactly as given: redirects are returned to the caller
/// rather than followed, the `Host` header set by the caller is kept, and
/// bodies are neither decompressed nor re-encoded.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    config: ReqwestTransportConfig,
}

impl ReqwestTransport {
    /// Create a transport with default timeouts
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize.
    pub fn new() -> Result<Self, ApplicationError> {
        Self::with_config(ReqwestTransportConfig::default())
    }

    /// Create a transport with custom configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize.
    pub fn with_config(config: ReqwestTransportConfig) -> Result<Self, ApplicationError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| ApplicationError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Get the configuration
    #[must_use]
    pub const fn config(&self) -> &ReqwestTransportConfig {
        &self.config
    }

    /// Map a reqwest failure onto the transport error taxonomy
    fn map_error(err: &reqwest::Error) -> TransportError {
        let message = error_chain(err);
        if err.is_timeout() {
            TransportError::Timeout(message)
        } else if err.is_connect() {
            TransportError::Connect(message)
        } else if err.is_body() || err.is_decode() {
            TransportError::Body(message)
        } else if err.is_request() || err.is_builder() {
            TransportError::Request(message)
        } else {
            TransportError::Other(message)
        }
    }
}

/// Render an error with all of its sources, outermost first
fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[async_trait]
impl TransportPort for ReqwestTransport {
    #[instrument(skip_all, fields(method = %request.method(), uri = %request.uri()))]
    async fn round_trip(&self, mut request: ProxyRequest) -> Result<ProxyResponse, TransportError> {
        // Protocol is negotiated per upstream connection, not inherited from the client
        *request.version_mut() = Version::HTTP_11;

        let request = reqwest::Request::try_from(request)
            .map_err(|e| TransportError::Request(error_chain(&e)))?;

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| Self::map_error(&e))?;

        let status = response.status();
        let version = response.version();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| Self::map_error(&e))?;

        debug!(status = %status, bytes = body.len(), "Upstream responded");

        let mut out = ProxyResponse::new(body);
        *out.status_mut() = status;
        *out.version_mut() = version;
        *out.headers_mut() = headers;
        Ok(out)
    }
}
