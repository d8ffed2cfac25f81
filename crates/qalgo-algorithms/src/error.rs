//! Error types for the algorithm routines.

use qalgo_hal::HalError;
use qalgo_ir::IrError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors returned by QFT, QPE, Shor and QUBO routines.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AlgorithmError {
    /// Caller-supplied value outside the routine's domain.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unitary that cannot be turned into a controlled operation.
    #[error("Invalid operator: {0}")]
    InvalidOperator(String),

    /// Circuit construction failed.
    #[error(transparent)]
    Ir(#[from] IrError),

    /// Circuit execution failed.
    #[error(transparent)]
    Backend(#[from] HalError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for algorithm routines.
pub type AlgorithmResult<T> = Result<T, AlgorithmError>;
