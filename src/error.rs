//! Error types for the so3-manifold library
//!
//! This module provides the crate-wide error and result types. Module-specific
//! errors convert into [`So3Error`] through `From`, so `?` works across module
//! boundaries. All errors use the `thiserror` crate for trait implementations.

use crate::{manifold::ManifoldError, verification::VerificationError};
use thiserror::Error;

/// Main result type used throughout the so3-manifold library
pub type So3Result<T> = Result<T, So3Error>;

/// Main error type for the so3-manifold library
#[derive(Debug, Clone, Error)]
pub enum So3Error {
    /// Manifold operations errors
    #[error("Manifold error: {0}")]
    Manifold(String),

    /// A numerical contract was violated during verification
    #[error("Verification error: {0}")]
    Verification(String),

    /// Invalid input parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Logging subscriber could not be installed
    #[error("Logging error: {0}")]
    Logging(String),
}

impl From<ManifoldError> for So3Error {
    fn from(err: ManifoldError) -> Self {
        So3Error::Manifold(err.to_string())
    }
}

impl From<VerificationError> for So3Error {
    fn from(err: VerificationError) -> Self {
        So3Error::Verification(err.to_string())
    }
}
