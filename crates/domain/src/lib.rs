//! Domain layer for faultline
//!
//! Contains the fault configuration, its validated value objects, and domain
//! errors. This layer knows nothing about HTTP clients or servers.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
