//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod transport_port;

#[cfg(test)]
pub use transport_port::MockTransportPort;
pub use transport_port::{ProxyRequest, ProxyResponse, TransportError, TransportPort};
