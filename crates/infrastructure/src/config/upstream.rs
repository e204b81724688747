//! Outbound connection settings for the underlying transport.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::adapters::ReqwestTransportConfig;

/// Upstream (destination) connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Idle connections kept per destination host
    #[serde(default = "default_pool_max_idle")]
    pub pool_max_idle_per_host: usize,
}

const fn default_connect_timeout() -> u64 {
    10
}

const fn default_timeout() -> u64 {
    30
}

const fn default_pool_max_idle() -> usize {
    32
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            timeout_secs: default_timeout(),
            pool_max_idle_per_host: default_pool_max_idle(),
        }
    }
}

impl UpstreamConfig {
    /// Build the transport configuration
    pub const fn to_transport_config(&self) -> ReqwestTransportConfig {
        ReqwestTransportConfig {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            timeout: Duration::from_secs(self.timeout_secs),
            pool_max_idle_per_host: self.pool_max_idle_per_host,
        }
    }
}
