//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer and provides the
//! configuration and logging setup shared by the binaries.

pub mod adapters;
pub mod config;
pub mod telemetry;

pub use adapters::*;
pub use config::{AppConfig, ProxyAppConfig, ServerConfig, UpstreamConfig};
pub use telemetry::{LogFormat, TelemetryConfig, TelemetryError, init_telemetry};
