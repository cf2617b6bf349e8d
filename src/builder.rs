use crate::types::SalaryError;

/// Trait for builders that produce a validated configuration object.
///
/// This creates a unified interface for object creation across the crate.
pub trait Builder<T> {
    /// Builds the final object, returning a Result.
    fn build(self) -> Result<T, SalaryError>;
}

/// Implemented by anything that can check its own invariants before use.
pub trait Validate {
    fn validate(&self) -> Result<(), SalaryError>;
}
