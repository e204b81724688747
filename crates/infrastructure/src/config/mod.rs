//! Application configuration
//!
//! Split into focused sub-modules:
//! - `server`: HTTP listener settings
//! - `proxy`: Destination and fault-injection parameters
//! - `upstream`: Outbound client timeouts and pooling
//!
//! Logging settings live with the telemetry setup in [`crate::telemetry`].
//!
//! Sources are layered: built-in defaults, then `config.toml` (or an
//! explicit path), then `FAULTLINE_*` environment variables using `__`
//! between section and key, e.g. `FAULTLINE_PROXY__DROP_PROBABILITY=0.1`.

mod proxy;
mod server;
mod upstream;

use std::path::Path;

use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, builder::DefaultState};
use domain::{DomainError, FaultConfig};
use serde::{Deserialize, Serialize};

pub use proxy::ProxyAppConfig;
pub use server::ServerConfig;
pub use upstream::UpstreamConfig;

use crate::telemetry::TelemetryConfig;

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "FAULTLINE";

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Fault-injection configuration
    #[serde(default)]
    pub proxy: ProxyAppConfig,

    /// Outbound client configuration
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from environment and optional `config.toml`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, reading `path` instead of `config.toml` if given
    ///
    /// An explicit path must exist; the default file is optional.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = path.map_or_else(
            || File::with_name("config").required(false),
            |p| File::from(p).required(true),
        );

        Self::defaults()?
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Parse configuration from a TOML string on top of the defaults
    ///
    /// Environment variables are not consulted.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let server = ServerConfig::default();
        Config::builder()
            .set_default("server.host", server.host)?
            .set_default("server.port", i64::from(server.port))
    }

    /// Validated fault configuration for the proxy
    pub fn fault_config(&self) -> Result<FaultConfig, DomainError> {
        self.proxy.to_fault_config()
    }
}
