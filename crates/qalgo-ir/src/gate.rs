//! Quantum gate types.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::parameter::ParameterExpression;

/// Built-in gates. Controls come first in the operand list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    X,
    Y,
    Z,
    H,
    /// `√Z`
    S,
    Sdg,
    /// `Z^¼`
    T,
    Tdg,
    Rx(ParameterExpression),
    Ry(ParameterExpression),
    Rz(ParameterExpression),
    /// `diag(1, e^{iλ})`
    P(ParameterExpression),
    CX,
    CY,
    CZ,
    CH,
    Swap,
    CRx(ParameterExpression),
    CRy(ParameterExpression),
    CRz(ParameterExpression),
    CP(ParameterExpression),
    CCX,
    CSwap,
}

impl StandardGate {
    /// Lower-case mnemonic, as used in operation counts.
    #[inline]
    pub fn name(&self) -> &'static str {
        use StandardGate as G;
        match self {
            G::X => "x",
            G::Y => "y",
            G::Z => "z",
            G::H => "h",
            G::S => "s",
            G::Sdg => "sdg",
            G::T => "t",
            G::Tdg => "tdg",
            G::Rx(_) => "rx",
            G::Ry(_) => "ry",
            G::Rz(_) => "rz",
            G::P(_) => "p",
            G::CX => "cx",
            G::CY => "cy",
            G::CZ => "cz",
            G::CH => "ch",
            G::Swap => "swap",
            G::CRx(_) => "crx",
            G::CRy(_) => "cry",
            G::CRz(_) => "crz",
            G::CP(_) => "cp",
            G::CCX => "ccx",
            G::CSwap => "cswap",
        }
    }

    /// Controls plus target width.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        let targets = match self {
            StandardGate::Swap | StandardGate::CSwap => 2,
            _ => 1,
        };
        self.num_controls() + targets
    }

    /// Number of leading control qubits.
    pub fn num_controls(&self) -> u32 {
        match self {
            StandardGate::CX
            | StandardGate::CY
            | StandardGate::CZ
            | StandardGate::CH
            | StandardGate::CRx(_)
            | StandardGate::CRy(_)
            | StandardGate::CRz(_)
            | StandardGate::CP(_)
            | StandardGate::CSwap => 1,
            StandardGate::CCX => 2,
            _ => 0,
        }
    }

    /// Whether the angle still holds a symbol.
    pub fn is_parameterized(&self) -> bool {
        self.parameter().is_some_and(ParameterExpression::is_symbolic)
    }

    /// The rotation angle, if the gate has one.
    pub fn parameter(&self) -> Option<&ParameterExpression> {
        match self {
            StandardGate::Rx(p)
            | StandardGate::Ry(p)
            | StandardGate::Rz(p)
            | StandardGate::P(p)
            | StandardGate::CRx(p)
            | StandardGate::CRy(p)
            | StandardGate::CRz(p)
            | StandardGate::CP(p) => Some(p),
            _ => None,
        }
    }

    /// Same gate with `f` applied to its angle.
    pub fn map_parameter(&self, f: impl FnOnce(&ParameterExpression) -> ParameterExpression) -> Self {
        match self {
            StandardGate::Rx(p) => StandardGate::Rx(f(p)),
            StandardGate::Ry(p) => StandardGate::Ry(f(p)),
            StandardGate::Rz(p) => StandardGate::Rz(f(p)),
            StandardGate::P(p) => StandardGate::P(f(p)),
            StandardGate::CRx(p) => StandardGate::CRx(f(p)),
            StandardGate::CRy(p) => StandardGate::CRy(f(p)),
            StandardGate::CRz(p) => StandardGate::CRz(f(p)),
            StandardGate::CP(p) => StandardGate::CP(f(p)),
            other => other.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GateKind {
    Standard(StandardGate),
    Custom(CustomGate),
}

impl GateKind {
    #[inline]
    pub fn name(&self) -> &str {
        match self {
            GateKind::Standard(g) => g.name(),
            GateKind::Custom(g) => &g.name,
        }
    }

    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            GateKind::Standard(g) => g.num_qubits(),
            GateKind::Custom(g) => g.num_qubits,
        }
    }
}

/// A gate defined by an explicit unitary matrix.
///
/// The matrix is row-major with dimension 2^n. Bit k of a row or column
/// index is the state of the k-th qubit in the instruction's operand list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomGate {
    pub name: String,
    pub num_qubits: u32,
    /// `None` for opaque gates, which cannot be simulated or inverted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matrix: Option<Vec<Complex64>>,
}

impl CustomGate {
    /// Opaque gate without a matrix.
    pub fn new(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            matrix: None,
        }
    }

    /// Attach a matrix of `4^n` entries.
    pub fn with_matrix(mut self, matrix: Vec<Complex64>) -> IrResult<Self> {
        let expected = self.dim() * self.dim();
        if matrix.len() != expected {
            return Err(IrError::InvalidMatrix {
                gate_name: self.name,
                num_qubits: self.num_qubits,
                expected,
                got: matrix.len(),
            });
        }
        self.matrix = Some(matrix);
        Ok(self)
    }

    /// Build a gate that maps basis state `c` to `targets[c]`.
    ///
    /// `targets` must be a permutation of `0..2^num_qubits`.
    pub fn permutation(
        name: impl Into<String>,
        num_qubits: u32,
        targets: &[usize],
    ) -> IrResult<Self> {
        let gate = Self::new(name, num_qubits);
        let dim = gate.dim();
        let mut hit = vec![false; dim];
        let is_permutation = targets.len() == dim
            && targets
                .iter()
                .all(|&row| row < dim && !std::mem::replace(&mut hit[row], true));
        if !is_permutation {
            return Err(IrError::InvalidMatrix {
                gate_name: gate.name,
                num_qubits,
                expected: dim,
                got: targets.len(),
            });
        }
        let mut matrix = vec![Complex64::new(0.0, 0.0); dim * dim];
        for (col, &row) in targets.iter().enumerate() {
            matrix[row * dim + col] = Complex64::new(1.0, 0.0);
        }
        gate.with_matrix(matrix)
    }

    /// Matrix dimension (2^n).
    #[inline]
    pub fn dim(&self) -> usize {
        1usize << self.num_qubits
    }

    /// Controlled version with the control as the first operand.
    pub fn controlled(&self) -> IrResult<Self> {
        let matrix = self
            .matrix
            .as_ref()
            .ok_or_else(|| IrError::NotControllable(self.name.clone()))?;
        let dim = self.dim();
        let cdim = dim * 2;
        let mut out = vec![Complex64::new(0.0, 0.0); cdim * cdim];
        for r in 0..dim {
            // Control clear: identity on the targets.
            out[(r << 1) * cdim + (r << 1)] = Complex64::new(1.0, 0.0);
            for c in 0..dim {
                out[((r << 1) | 1) * cdim + ((c << 1) | 1)] = matrix[r * dim + c];
            }
        }
        Self::new(format!("c-{}", self.name), self.num_qubits + 1).with_matrix(out)
    }

    /// Conjugate transpose.
    pub fn adjoint(&self) -> IrResult<Self> {
        let matrix = self
            .matrix
            .as_ref()
            .ok_or_else(|| IrError::NotInvertible(self.name.clone()))?;
        let dim = self.dim();
        let mut out = vec![Complex64::new(0.0, 0.0); dim * dim];
        for r in 0..dim {
            for c in 0..dim {
                out[c * dim + r] = matrix[r * dim + c].conj();
            }
        }
        let name = match self.name.strip_suffix('†') {
            Some(base) => base.to_string(),
            None => format!("{}†", self.name),
        };
        Self::new(name, self.num_qubits).with_matrix(out)
    }
}

/// A gate plus an optional drawing label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    pub kind: GateKind,
    /// Shown in drawings instead of the name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Gate {
    pub fn standard(gate: StandardGate) -> Self {
        Self {
            kind: GateKind::Standard(gate),
            label: None,
        }
    }

    pub fn custom(gate: CustomGate) -> Self {
        Self {
            kind: GateKind::Custom(gate),
            label: None,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn name(&self) -> &str {
        self.kind.name()
    }

    pub fn num_qubits(&self) -> u32 {
        self.kind.num_qubits()
    }
}

impl From<StandardGate> for Gate {
    fn from(gate: StandardGate) -> Self {
        Gate::standard(gate)
    }
}

impl From<CustomGate> for Gate {
    fn from(gate: CustomGate) -> Self {
        Gate::custom(gate)
    }
}
