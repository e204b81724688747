//! Request ID middleware for log correlation
//!
//! Takes the client's `X-Request-Id` (or generates a UUIDv7) and opens a
//! span carrying it, so every fault-injection event for a request can be
//! tied together. Proxied traffic is left untouched: the header is neither
//! added to the outbound request nor to the response.

use std::{
    fmt,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use axum::{body::Body, extract::Request, response::Response};
use tower::{Layer, Service};
use tracing::Instrument;
use uuid::Uuid;

/// The header name for the request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest client-supplied ID accepted as-is
const MAX_CLIENT_ID_LEN: usize = 128;

/// Layer that opens a per-request span keyed by request ID
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdLayer;

impl RequestIdLayer {
    /// Create a new request ID layer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

/// Service that wraps each request in a `proxy_request` span
#[derive(Debug, Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for RequestIdService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<Body>) -> Self::Future {
        let request_id = RequestId::from_request(&request);

        let span = tracing::info_span!(
            "proxy_request",
            request_id = %request_id,
            method = %request.method(),
            path = %request.uri().path(),
        );
        request.extensions_mut().insert(request_id);

        // Take the service that was driven to readiness, leave a fresh clone behind
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move { inner.call(request).await }.instrument(span))
    }
}

/// Request ID supplied by the client or generated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestId {
    /// Taken from the inbound `X-Request-Id` header
    Client(String),
    /// Generated by the proxy
    Generated(Uuid),
}

impl RequestId {
    /// Extract the client's ID, or generate one when absent or unusable
    pub fn from_request<B>(request: &Request<B>) -> Self {
        request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty() && id.len() <= MAX_CLIENT_ID_LEN)
            .map_or_else(
                || Self::Generated(Uuid::now_v7()),
                |id| Self::Client(id.to_string()),
            )
    }

    /// Whether the client supplied this ID
    pub const fn is_client_supplied(&self) -> bool {
        matches!(self, Self::Client(_))
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client(id) => f.write_str(id),
            Self::Generated(uuid) => write!(f, "{uuid}"),
        }
    }
}
