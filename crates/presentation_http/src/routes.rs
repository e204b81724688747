//! Route definitions

use axum::{Router, extract::DefaultBodyLimit};
use tower_http::trace::TraceLayer;

use crate::{handlers, middleware::RequestIdLayer, state::AppState};

/// Create the proxy router
///
/// There are no local routes: every method and path is forwarded.
pub fn create_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_body_bytes);
    Router::new()
        .fallback(handlers::proxy::proxy_request)
        .layer(body_limit)
        .with_state(state)
}

/// Router with request tracing applied (first added = innermost)
pub fn create_app(state: AppState) -> Router {
    create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(RequestIdLayer::new())
}
