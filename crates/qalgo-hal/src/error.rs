//! Backend and job errors.

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    #[error("backend not available: {0}")]
    BackendUnavailable(String),

    #[error("unknown backend '{name}' (registered: {available})")]
    UnknownBackend {
        name: String,
        /// Comma-separated registered names.
        available: String,
    },

    #[error("no job with id {0}")]
    JobNotFound(String),

    #[error("job failed: {0}")]
    JobFailed(String),

    #[error("job was cancelled")]
    JobCancelled,

    #[error("invalid circuit: {0}")]
    InvalidCircuit(String),

    /// Reported before any other validation, so callers can tell a
    /// too-wide request apart from a malformed one.
    #[error("circuit needs {qubits} qubits, backend allows at most {max}")]
    CircuitTooLarge { qubits: usize, max: usize },

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("shot count {shots} outside 1..={max}")]
    InvalidShots { shots: u32, max: u32 },

    #[error("backend configuration: {0}")]
    Configuration(String),

    #[error("backend error: {0}")]
    Backend(String),
}

pub type HalResult<T> = Result<T, HalError>;
