//! Error handling for the infrastructure layer.

mod conversions;

pub use conversions::InfraError;
