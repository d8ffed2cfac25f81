//! Circuit construction errors.

use crate::qubit::{ClbitId, QubitId};
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    #[error("{qubit} is not a wire of this circuit{}", on_gate(.gate_name))]
    QubitNotFound {
        qubit: QubitId,
        gate_name: Option<String>,
    },

    #[error("{clbit} is not a wire of this circuit{}", on_gate(.gate_name))]
    ClbitNotFound {
        clbit: ClbitId,
        gate_name: Option<String>,
    },

    /// Malformed graph or circuit description.
    #[error("invalid circuit structure: {0}")]
    InvalidDag(String),

    #[error("gate '{gate_name}' acts on {expected} qubits but was given {got}")]
    QubitCountMismatch {
        gate_name: String,
        expected: u32,
        got: u32,
    },

    /// A symbol survived to a point that needs a number.
    #[error("parameter '{0}' has no value")]
    UnboundParameter(String),

    #[error("{qubit} appears twice{}", on_gate(.gate_name))]
    DuplicateQubit {
        qubit: QubitId,
        gate_name: Option<String>,
    },

    #[error("{clbit} appears twice{}", on_gate(.gate_name))]
    DuplicateClbit {
        clbit: ClbitId,
        gate_name: Option<String>,
    },

    /// Measurements and resets have no adjoint.
    #[error("'{0}' has no inverse")]
    NotInvertible(String),

    #[error("'{0}' has no controlled form")]
    NotControllable(String),

    /// A matrix gate needs `4^n` entries.
    #[error("matrix gate '{gate_name}' on {num_qubits} qubits needs {expected} entries, got {got}")]
    InvalidMatrix {
        gate_name: String,
        num_qubits: u32,
        expected: usize,
        got: usize,
    },

    /// Wire list length differs from the width of the composed circuit.
    #[error("cannot compose '{name}' onto {got} wires, it has {expected}")]
    WidthMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
}

#[allow(clippy::ref_option)]
fn on_gate(gate_name: &Option<String>) -> String {
    gate_name
        .as_deref()
        .map(|name| format!(" (in {name})"))
        .unwrap_or_default()
}

pub type IrResult<T> = Result<T, IrError>;
