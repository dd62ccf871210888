//! Validation of object graphs: the traversal engine, the per-call context
//! and the public [`ValidatorFactory`] / [`Validator`] entry points.

mod context;
mod engine;
pub mod factory;
pub mod validator;
pub mod violation;

pub use factory::{ValidatorFactory, ValidatorFactoryBuilder};
pub use validator::Validator;
pub use violation::{ConstraintViolation, ValidationResult};
