//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// Destination is not a usable absolute URL
    #[error("Invalid destination: {0}")]
    InvalidDestination(String),

    /// Drop probability outside of [0, 1]
    #[error("Invalid drop probability: {0} (must be between 0 and 1)")]
    InvalidProbability(f64),

    /// Delay rate that cannot parameterise a distribution
    #[error("Invalid delay rate: {0} (must be a finite number)")]
    InvalidDelayRate(f64),
}

impl DomainError {
    /// Create an invalid destination error
    pub fn invalid_destination(reason: impl Into<String>) -> Self {
        Self::InvalidDestination(reason.into())
    }
}
