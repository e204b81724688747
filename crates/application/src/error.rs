//! Application-level errors

use domain::DomainError;
use thiserror::Error;

use crate::ports::TransportError;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Transport-level error
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
