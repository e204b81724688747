//! Value Objects - Immutable, identity-less domain primitives

mod delay_spec;
mod destination;
mod drop_probability;
mod seed;

pub use delay_spec::DelaySpec;
pub use destination::Destination;
pub use drop_probability::DropProbability;
pub use seed::Seed;
