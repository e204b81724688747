//! Reverse proxy assembly
//!
//! Rewrites inbound requests onto the destination and sends them through
//! the fault-injecting transport. The client-observed `Host` header is kept
//! so the destination sees the same virtual host the client asked for.

use std::sync::Arc;

use application::FaultInjectingTransport;
use application::ports::{ProxyRequest, ProxyResponse, TransportPort};
use axum::body::Bytes;
use axum::http::{
    HeaderMap, HeaderName, HeaderValue, Uri,
    header::{
        CONNECTION, HOST, PROXY_AUTHENTICATE, PROXY_AUTHORIZATION, TE, TRAILER,
        TRANSFER_ENCODING, UPGRADE,
    },
    request,
};
use domain::{Destination, DomainError, FaultConfig};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::ProxyError;

/// Headers that describe a single connection and must not be forwarded
static HOP_BY_HOP: [HeaderName; 9] = [
    CONNECTION,
    HeaderName::from_static("keep-alive"),
    HeaderName::from_static("proxy-connection"),
    TRANSFER_ENCODING,
    TE,
    TRAILER,
    UPGRADE,
    PROXY_AUTHENTICATE,
    PROXY_AUTHORIZATION,
];

/// Request handler forwarding everything to one destination
///
/// Holds only the destination and the transport; cloning is cheap.
#[derive(Debug, Clone)]
pub struct ReverseProxy {
    destination: Destination,
    transport: Arc<FaultInjectingTransport>,
}

impl ReverseProxy {
    /// Create a proxy for a destination URL
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidDestination` if `destination` is not an
    /// absolute `http`/`https` URL.
    pub fn new(
        destination: &str,
        transport: Arc<FaultInjectingTransport>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            destination: Destination::parse(destination)?,
            transport,
        })
    }

    /// Wrap `inner` with the faults in `config` and proxy to its destination
    pub fn assemble(config: FaultConfig, inner: Arc<dyn TransportPort>) -> Self {
        let destination = config.destination().clone();
        Self {
            destination,
            transport: Arc::new(FaultInjectingTransport::new(config, inner)),
        }
    }

    /// Destination requests are forwarded to
    pub const fn destination(&self) -> &Destination {
        &self.destination
    }

    /// Fault-injecting transport used for sending
    pub const fn transport(&self) -> &Arc<FaultInjectingTransport> {
        &self.transport
    }

    /// Rewrite and send one request
    ///
    /// `cancel` aborts the request if it fires during an injected delay.
    pub async fn forward(
        &self,
        parts: request::Parts,
        body: Bytes,
        cancel: &CancellationToken,
    ) -> Result<ProxyResponse, ProxyError> {
        let request = self.rewrite(parts, body)?;
        debug!(uri = %request.uri(), "Forwarding request");
        Ok(self.transport.round_trip_until(request, cancel).await?)
    }

    /// Build the outbound request for an inbound one
    pub fn rewrite(&self, parts: request::Parts, body: Bytes) -> Result<ProxyRequest, ProxyError> {
        let host = inbound_host(&parts);
        let uri = self.target_uri(&parts.uri)?;

        let mut headers = parts.headers;
        strip_hop_by_hop(&mut headers);
        if let Some(host) = host {
            headers.insert(HOST, host);
        }

        let mut request = ProxyRequest::new(body);
        *request.method_mut() = parts.method;
        *request.uri_mut() = uri;
        *request.version_mut() = parts.version;
        *request.headers_mut() = headers;
        Ok(request)
    }

    fn target_uri(&self, inbound: &Uri) -> Result<Uri, ProxyError> {
        let path = join_paths(self.destination.path(), inbound.path());
        let query = match (self.destination.query(), inbound.query()) {
            (Some(base), Some(extra)) if !base.is_empty() => Some(format!("{base}&{extra}")),
            (_, Some(extra)) => Some(extra.to_string()),
            (Some(base), None) => Some(base.to_string()),
            (None, None) => None,
        };

        let mut target = format!(
            "{}://{}{}",
            self.destination.scheme(),
            self.destination.authority(),
            path
        );
        if let Some(query) = query {
            target.push('?');
            target.push_str(&query);
        }

        target
            .parse::<Uri>()
            .map_err(|e| ProxyError::Rewrite(format!("{target}: {e}")))
    }
}

/// Host the client addressed: the `Host` header, else the URI authority
fn inbound_host(parts: &request::Parts) -> Option<HeaderValue> {
    parts.headers.get(HOST).cloned().or_else(|| {
        parts
            .uri
            .authority()
            .and_then(|authority| HeaderValue::from_str(authority.as_str()).ok())
    })
}

/// Join two paths with exactly one slash between them
fn join_paths(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{base}{}", &path[1..]),
        (false, false) => format!("{base}/{path}"),
        _ => format!("{base}{path}"),
    }
}

/// Remove hop-by-hop headers, including any named in `Connection`
pub(crate) fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
}
