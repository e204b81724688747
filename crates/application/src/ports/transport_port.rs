//! Transport port
//!
//! The "send a request, get a response or an error" capability. The default
//! adapter lives in the infrastructure layer; the fault injector both
//! consumes and implements this port so the two stack transparently.

use async_trait::async_trait;
use bytes::Bytes;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

/// Outbound request with a fully buffered body
pub type ProxyRequest = http::Request<Bytes>;

/// Upstream response with a fully buffered body
pub type ProxyResponse = http::Response<Bytes>;

/// Errors produced while sending a request
///
/// The forwarding variants come from the underlying transport and are passed
/// through untouched. `Dropped` and `Cancelled` are only ever produced by the
/// fault-injection layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Could not establish a connection (DNS, refused, TLS handshake)
    #[error("Connection failed: {0}")]
    Connect(String),

    /// Upstream did not answer in time
    #[error("Upstream timed out: {0}")]
    Timeout(String),

    /// Request could not be built or sent
    #[error("Request failed: {0}")]
    Request(String),

    /// Reading or writing a body failed
    #[error("Body transfer failed: {0}")]
    Body(String),

    /// Any other transport failure
    #[error("Transport error: {0}")]
    Other(String),

    /// Request was deliberately dropped by fault injection
    #[error("Request dropped by fault injection")]
    Dropped,

    /// Request was cancelled while waiting out an injected delay
    #[error("Request cancelled during injected delay")]
    Cancelled,
}

impl TransportError {
    /// Whether this error was synthesized by fault injection
    #[must_use]
    pub const fn is_injected(&self) -> bool {
        matches!(self, Self::Dropped)
    }

    /// Whether this error came from the underlying transport
    #[must_use]
    pub const fn is_forwarding(&self) -> bool {
        !matches!(self, Self::Dropped | Self::Cancelled)
    }
}

/// Port for sending a request to an upstream server
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TransportPort: Send + Sync {
    /// Perform one request/response round trip
    async fn round_trip(&self, request: ProxyRequest) -> Result<ProxyResponse, TransportError>;
}
