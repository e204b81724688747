//! Faultline HTTP presentation layer
//!
//! Serves the fault-injecting reverse proxy over HTTP.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod proxy;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ProxyError;
pub use middleware::{RequestId, RequestIdLayer};
pub use proxy::ReverseProxy;
pub use routes::{create_app, create_router};
pub use server::{build_state, serve, serve_until};
pub use state::AppState;
