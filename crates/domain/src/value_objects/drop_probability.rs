//! Drop probability value object
//!
//! The chance, in `[0, 1]`, that a request is dropped instead of forwarded.
//!
//! # Examples
//!
//! ```
//! use domain::DropProbability;
//!
//! let p = DropProbability::new(0.25).expect("valid probability");
//! assert!((p.value() - 0.25).abs() < f64::EPSILON);
//!
//! assert!(DropProbability::new(1.5).is_err());
//! assert!((DropProbability::clamped(1.5).value() - 1.0).abs() < f64::EPSILON);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Probability of dropping a request (0 = never, 1 = always)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize)]
#[serde(transparent)]
pub struct DropProbability(f64);

impl DropProbability {
    /// Never drop
    pub const NEVER: Self = Self(0.0);

    /// Always drop
    pub const ALWAYS: Self = Self(1.0);

    /// Create a validated probability
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidProbability` if the value is NaN or
    /// outside `[0, 1]`.
    pub fn new(value: f64) -> Result<Self, DomainError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(DomainError::InvalidProbability(value))
        }
    }

    /// Create a probability, clamping out-of-range values into `[0, 1]`
    ///
    /// NaN becomes 0.
    #[must_use]
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            Self::NEVER
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }

    /// Get the probability as an `f64`
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Whether this probability can never trigger
    #[must_use]
    pub fn is_never(self) -> bool {
        self.0 <= 0.0
    }

    /// Whether a uniform draw in `[0, 1)` counts as a drop
    #[must_use]
    pub fn is_hit(self, roll: f64) -> bool {
        roll < self.0
    }
}

impl fmt::Display for DropProbability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<f64> for DropProbability {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DropProbability> for f64 {
    fn from(p: DropProbability) -> Self {
        p.0
    }
}

impl<'de> Deserialize<'de> for DropProbability {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}
