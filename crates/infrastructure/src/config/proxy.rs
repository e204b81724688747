//! Fault-injection settings for the proxy.

use domain::{DelaySpec, Destination, DomainError, DropProbability, FaultConfig, Seed};
use serde::{Deserialize, Serialize};

/// Proxy configuration as read from file or environment
///
/// Rates are per millisecond; a rate of `0` disables that delay. A seed of
/// `0` draws from OS entropy, any other value makes runs reproducible.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProxyAppConfig {
    /// Absolute URL requests are forwarded to
    #[serde(default)]
    pub destination: Option<String>,

    /// Probability in `[0, 1]` that a request is dropped
    #[serde(default)]
    pub drop_probability: f64,

    /// Rate of the exponential delay before forwarding
    #[serde(default)]
    pub pre_delay_rate: f64,

    /// Upper bound on the pre-forward delay in milliseconds
    #[serde(default)]
    pub pre_delay_max_ms: u64,

    /// Rate of the exponential delay after forwarding
    #[serde(default)]
    pub post_delay_rate: f64,

    /// Upper bound on the post-forward delay in milliseconds
    #[serde(default)]
    pub post_delay_max_ms: u64,

    /// RNG seed (`0` = entropy)
    #[serde(default)]
    pub seed: u64,
}

impl ProxyAppConfig {
    /// Validate into a domain fault configuration
    pub fn to_fault_config(&self) -> Result<FaultConfig, DomainError> {
        let destination = self
            .destination
            .as_deref()
            .ok_or_else(|| DomainError::invalid_destination("no destination configured"))
            .and_then(Destination::parse)?;

        Ok(FaultConfig::builder(destination)
            .drop_probability(DropProbability::new(self.drop_probability)?)
            .pre_delay(DelaySpec::from_millis(
                self.pre_delay_rate,
                self.pre_delay_max_ms,
            )?)
            .post_delay(DelaySpec::from_millis(
                self.post_delay_rate,
                self.post_delay_max_ms,
            )?)
            .seed(Seed::new(self.seed))
            .build())
    }
}
