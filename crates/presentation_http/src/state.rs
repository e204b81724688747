//! Application state shared across handlers

use tokio_util::sync::CancellationToken;

use crate::proxy::ReverseProxy;

/// Default limit for buffered request bodies (16MB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Proxy every request is handed to
    pub proxy: ReverseProxy,
    /// Fired on shutdown; aborts requests waiting out an injected delay
    pub shutdown: CancellationToken,
    /// Largest request body buffered before forwarding
    pub max_body_bytes: usize,
}

impl AppState {
    /// Create state with a fresh shutdown token and the default body limit
    pub fn new(proxy: ReverseProxy) -> Self {
        Self {
            proxy,
            shutdown: CancellationToken::new(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Use an externally owned shutdown token
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Override the body limit
    #[must_use]
    pub const fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}
