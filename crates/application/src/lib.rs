//! Application layer - Use cases and orchestration
//!
//! Defines the transport port and the fault-injecting transport that
//! decorates it with delays and drops.

pub mod error;
pub mod ports;
pub mod services;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
