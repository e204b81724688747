//! Application services

mod delay_generator;
mod fault_injecting_transport;
mod fault_stats;

pub use delay_generator::{DelayGenerator, sample_delay};
pub use fault_injecting_transport::FaultInjectingTransport;
pub use fault_stats::FaultStats;
