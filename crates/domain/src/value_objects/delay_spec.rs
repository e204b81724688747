//! Delay specification value object
//!
//! An exponential-distribution rate paired with a hard maximum. Rates are
//! expressed per millisecond, so a rate of `0.01` gives a mean delay of
//! 100ms before clamping.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use domain::DelaySpec;
//!
//! let spec = DelaySpec::new(0.01, Duration::from_millis(500)).unwrap();
//! assert!(spec.is_enabled());
//! assert!((spec.max_millis() - 500.0).abs() < f64::EPSILON);
//!
//! // Non-positive rates disable the delay
//! assert!(!DelaySpec::new(0.0, Duration::from_secs(1)).unwrap().is_enabled());
//! ```

use std::fmt;
use std::time::Duration;

use crate::errors::DomainError;

/// Rate and clamp for one injected delay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelaySpec {
    rate: f64,
    max: Duration,
}

impl DelaySpec {
    /// Create a delay specification
    ///
    /// A rate `<= 0` is accepted and disables the delay.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidDelayRate` if the rate is NaN or infinite.
    pub fn new(rate: f64, max: Duration) -> Result<Self, DomainError> {
        if !rate.is_finite() {
            return Err(DomainError::InvalidDelayRate(rate));
        }
        Ok(Self { rate, max })
    }

    /// Convenience constructor taking the maximum in milliseconds
    ///
    /// # Errors
    ///
    /// Same as [`DelaySpec::new`].
    pub fn from_millis(rate: f64, max_ms: u64) -> Result<Self, DomainError> {
        Self::new(rate, Duration::from_millis(max_ms))
    }

    /// A delay that never fires
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            rate: 0.0,
            max: Duration::ZERO,
        }
    }

    /// Exponential rate parameter (per millisecond)
    #[must_use]
    pub const fn rate(&self) -> f64 {
        self.rate
    }

    /// Hard upper bound on a sampled delay
    #[must_use]
    pub const fn max(&self) -> Duration {
        self.max
    }

    /// The maximum as fractional milliseconds, the unit samples are drawn in
    #[must_use]
    pub fn max_millis(&self) -> f64 {
        self.max.as_secs_f64() * 1000.0
    }

    /// Whether sampling will draw randomness at all
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.rate > 0.0
    }
}

impl Default for DelaySpec {
    fn default() -> Self {
        Self::disabled()
    }
}

impl fmt::Display for DelaySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_enabled() {
            write!(f, "exp(rate={}/ms, max={:?})", self.rate, self.max)
        } else {
            write!(f, "disabled")
        }
    }
}
