//! Domain entities

mod fault_config;

pub use fault_config::{FaultConfig, FaultConfigBuilder};
