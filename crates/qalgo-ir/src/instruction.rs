//! Gates, measurements and barriers bound to concrete wires.

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::{Gate, GateKind, StandardGate};
use crate::qubit::{ClbitId, QubitId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstructionKind {
    Gate(Gate),
    /// `qubits[k]` is read into `clbits[k]`.
    Measure,
    /// Ordering marker; the state is untouched.
    Barrier,
}

/// One operation of a circuit together with its wires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub kind: InstructionKind,
    pub qubits: Vec<QubitId>,
    /// Empty unless `kind` is [`InstructionKind::Measure`].
    pub clbits: Vec<ClbitId>,
}

impl Instruction {
    fn on(kind: InstructionKind, qubits: Vec<QubitId>, clbits: Vec<ClbitId>) -> Self {
        Self {
            kind,
            qubits,
            clbits,
        }
    }

    /// `gate` applied to `qubits`, controls first.
    pub fn gate(gate: impl Into<Gate>, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self::on(
            InstructionKind::Gate(gate.into()),
            qubits.into_iter().collect(),
            Vec::new(),
        )
    }

    pub fn single_qubit_gate(gate: StandardGate, qubit: QubitId) -> Self {
        Self::gate(gate, [qubit])
    }

    pub fn two_qubit_gate(gate: StandardGate, q1: QubitId, q2: QubitId) -> Self {
        Self::gate(gate, [q1, q2])
    }

    pub fn measure(qubit: QubitId, clbit: ClbitId) -> Self {
        Self::on(InstructionKind::Measure, vec![qubit], vec![clbit])
    }

    /// Pairwise measurement of `qubits` into `clbits`.
    pub fn measure_all(
        qubits: impl IntoIterator<Item = QubitId>,
        clbits: impl IntoIterator<Item = ClbitId>,
    ) -> IrResult<Self> {
        let qubits: Vec<_> = qubits.into_iter().collect();
        let clbits: Vec<_> = clbits.into_iter().collect();
        if qubits.len() != clbits.len() {
            return Err(IrError::InvalidDag(format!(
                "cannot measure {} qubits into {} clbits",
                qubits.len(),
                clbits.len(),
            )));
        }
        Ok(Self::on(InstructionKind::Measure, qubits, clbits))
    }

    pub fn barrier(qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self::on(InstructionKind::Barrier, qubits.into_iter().collect(), Vec::new())
    }

    /// Same instruction acting on `qubits[q]` wherever it acted on `q`.
    ///
    /// Used when composing a sub-circuit onto a subset of wires.
    pub fn remapped(&self, qubits: &[QubitId], clbits: &[ClbitId]) -> IrResult<Self> {
        let map_q = |q: &QubitId| {
            qubits.get(q.index()).copied().ok_or(IrError::QubitNotFound {
                qubit: *q,
                gate_name: Some(self.name().to_string()),
            })
        };
        let map_c = |c: &ClbitId| {
            clbits.get(c.index()).copied().ok_or(IrError::ClbitNotFound {
                clbit: *c,
                gate_name: Some(self.name().to_string()),
            })
        };
        Ok(Self {
            kind: self.kind.clone(),
            qubits: self.qubits.iter().map(map_q).collect::<IrResult<_>>()?,
            clbits: self.clbits.iter().map(map_c).collect::<IrResult<_>>()?,
        })
    }

    pub fn is_gate(&self) -> bool {
        matches!(self.kind, InstructionKind::Gate(_))
    }

    pub fn is_measure(&self) -> bool {
        matches!(self.kind, InstructionKind::Measure)
    }

    pub fn is_barrier(&self) -> bool {
        matches!(self.kind, InstructionKind::Barrier)
    }

    /// The built-in gate, if any. `None` for matrix gates.
    pub fn as_standard(&self) -> Option<&StandardGate> {
        match &self.kind {
            InstructionKind::Gate(Gate {
                kind: GateKind::Standard(g),
                ..
            }) => Some(g),
            _ => None,
        }
    }

    /// Gate name, `measure` or `barrier`.
    pub fn name(&self) -> &str {
        match &self.kind {
            InstructionKind::Gate(g) => g.name(),
            InstructionKind::Measure => "measure",
            InstructionKind::Barrier => "barrier",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_instruction() {
        let inst = Instruction::single_qubit_gate(StandardGate::H, QubitId(0));
        assert!(inst.is_gate());
        assert_eq!(inst.qubits.len(), 1);
        assert_eq!(inst.name(), "h");
        assert_eq!(inst.as_standard(), Some(&StandardGate::H));
    }

    #[test]
    fn test_measure_instruction() {
        let inst = Instruction::measure(QubitId(0), ClbitId(0));
        assert!(inst.is_measure());
        assert_eq!(inst.clbits.len(), 1);

        assert!(Instruction::measure_all([QubitId(0), QubitId(1)], [ClbitId(0)]).is_err());
    }

    #[test]
    fn test_remapped() {
        let inst = Instruction::two_qubit_gate(StandardGate::CX, QubitId(0), QubitId(1));
        let moved = inst.remapped(&[QubitId(3), QubitId(5)], &[]).unwrap();
        assert_eq!(moved.qubits, vec![QubitId(3), QubitId(5)]);

        let err = inst.remapped(&[QubitId(3)], &[]);
        assert!(matches!(err, Err(IrError::QubitNotFound { qubit: QubitId(1), .. })));
    }
}
