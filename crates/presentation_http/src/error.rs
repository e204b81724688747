//! Proxy error handling
//!
//! Failures are answered with a bare status code. Details go to the log
//! only, so clients of the proxy see what they would see from a real
//! misbehaving network.

use application::ports::TransportError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors surfaced by the proxy handler
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Sending through the fault-injecting transport failed
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Request body is larger than the configured limit
    #[error("Request body exceeds {limit} bytes")]
    PayloadTooLarge {
        /// Configured limit in bytes
        limit: usize,
    },

    /// Reading the inbound body failed
    #[error("Failed to read request body: {0}")]
    RequestBody(String),

    /// The outbound URI could not be built
    #[error("Failed to rewrite request: {0}")]
    Rewrite(String),
}

impl ProxyError {
    /// HTTP status returned to the client
    pub const fn status_code(&self) -> StatusCode {
        match self {
            // A dropped request looks like an upstream that never answered
            Self::Transport(TransportError::Dropped) => StatusCode::GATEWAY_TIMEOUT,
            Self::Transport(TransportError::Cancelled) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Transport(_) => StatusCode::BAD_GATEWAY,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::RequestBody(_) => StatusCode::BAD_REQUEST,
            Self::Rewrite(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            Self::Transport(TransportError::Dropped | TransportError::Cancelled) => {
                debug!(status = %status, error = %self, "Request ended by fault injection");
            },
            _ => warn!(status = %status, error = %self, "Proxy request failed"),
        }
        status.into_response()
    }
}
