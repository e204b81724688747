//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod reqwest_transport;

pub use reqwest_transport::{ReqwestTransport, ReqwestTransportConfig};
