//! RNG seed value object

use std::fmt;

use serde::{Deserialize, Serialize};

/// Seed for the fault-injection RNG
///
/// Zero means "seed from OS entropy"; any other value gives a reproducible
/// sequence of draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seed(u64);

impl Seed {
    /// Non-deterministic seed
    pub const ENTROPY: Self = Self(0);

    /// Wrap a raw seed value
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw seed value
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Whether this seed yields a reproducible sequence
    #[must_use]
    pub const fn is_deterministic(self) -> bool {
        self.0 != 0
    }
}

impl From<u64> for Seed {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_deterministic() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "entropy")
        }
    }
}
