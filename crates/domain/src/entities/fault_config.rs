//! Fault configuration
//!
//! The immutable description of how a proxy perturbs traffic: where it
//! forwards to, how often it drops, how long it waits before and after
//! forwarding, and how its randomness is seeded.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use domain::{DelaySpec, Destination, DropProbability, FaultConfig, Seed};
//!
//! let config = FaultConfig::builder(Destination::parse("http://localhost:3000").unwrap())
//!     .drop_probability(DropProbability::new(0.1).unwrap())
//!     .pre_delay(DelaySpec::new(0.02, Duration::from_millis(200)).unwrap())
//!     .seed(Seed::new(7))
//!     .build();
//!
//! assert!(config.pre_delay().is_enabled());
//! assert!(!config.post_delay().is_enabled());
//! ```

use std::fmt;

use crate::value_objects::{DelaySpec, Destination, DropProbability, Seed};

/// Immutable fault-injection configuration
#[derive(Debug, Clone, PartialEq)]
pub struct FaultConfig {
    destination: Destination,
    drop_probability: DropProbability,
    pre_delay: DelaySpec,
    post_delay: DelaySpec,
    seed: Seed,
}

impl FaultConfig {
    /// Start building a configuration for the given destination
    #[must_use]
    pub fn builder(destination: Destination) -> FaultConfigBuilder {
        FaultConfigBuilder {
            destination,
            drop_probability: DropProbability::NEVER,
            pre_delay: DelaySpec::disabled(),
            post_delay: DelaySpec::disabled(),
            seed: Seed::ENTROPY,
        }
    }

    /// A configuration that forwards everything untouched
    #[must_use]
    pub fn passthrough(destination: Destination) -> Self {
        Self::builder(destination).build()
    }

    /// Where requests are forwarded to
    #[must_use]
    pub const fn destination(&self) -> &Destination {
        &self.destination
    }

    /// Chance that a request is dropped
    #[must_use]
    pub const fn drop_probability(&self) -> DropProbability {
        self.drop_probability
    }

    /// Delay applied before forwarding
    #[must_use]
    pub const fn pre_delay(&self) -> DelaySpec {
        self.pre_delay
    }

    /// Delay applied after the response (or drop) is known
    #[must_use]
    pub const fn post_delay(&self) -> DelaySpec {
        self.post_delay
    }

    /// RNG seed
    #[must_use]
    pub const fn seed(&self) -> Seed {
        self.seed
    }

    /// Whether this configuration injects no faults at all
    #[must_use]
    pub fn is_passthrough(&self) -> bool {
        self.drop_probability.is_never()
            && !self.pre_delay.is_enabled()
            && !self.post_delay.is_enabled()
    }
}

impl fmt::Display for FaultConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "destination={} drop={} pre={} post={} seed={}",
            self.destination, self.drop_probability, self.pre_delay, self.post_delay, self.seed
        )
    }
}

/// Builder for [`FaultConfig`]
#[derive(Debug, Clone)]
pub struct FaultConfigBuilder {
    destination: Destination,
    drop_probability: DropProbability,
    pre_delay: DelaySpec,
    post_delay: DelaySpec,
    seed: Seed,
}

impl FaultConfigBuilder {
    /// Set the drop probability
    #[must_use]
    pub const fn drop_probability(mut self, probability: DropProbability) -> Self {
        self.drop_probability = probability;
        self
    }

    /// Set the pre-forwarding delay
    #[must_use]
    pub const fn pre_delay(mut self, spec: DelaySpec) -> Self {
        self.pre_delay = spec;
        self
    }

    /// Set the post-forwarding delay
    #[must_use]
    pub const fn post_delay(mut self, spec: DelaySpec) -> Self {
        self.post_delay = spec;
        self
    }

    /// Set the RNG seed
    #[must_use]
    pub const fn seed(mut self, seed: Seed) -> Self {
        self.seed = seed;
        self
    }

    /// Finish building
    #[must_use]
    pub fn build(self) -> FaultConfig {
        FaultConfig {
            destination: self.destination,
            drop_probability: self.drop_probability,
            pre_delay: self.pre_delay,
            post_delay: self.post_delay,
            seed: self.seed,
        }
    }
}
