//! Gate and circuit inversion.

use crate::circuit::Circuit;
use crate::error::{IrError, IrResult};
use crate::gate::{Gate, GateKind, StandardGate};
use crate::instruction::{Instruction, InstructionKind};
use crate::parameter::ParameterExpression;

/// Compute the inverse of a standard gate.
///
/// For unitary gates U, this returns U† (U-dagger).
///
/// - H† = H, X† = X and the other Hermitian gates map to themselves
/// - S† = Sdg, T† = Tdg
/// - Rx(θ)† = Rx(-θ), and likewise for every rotation and phase gate
pub fn inverse_gate(gate: &StandardGate) -> StandardGate {
    match gate {
        g if is_self_inverse(g) => g.clone(),
        StandardGate::S => StandardGate::Sdg,
        StandardGate::Sdg => StandardGate::S,
        StandardGate::T => StandardGate::Tdg,
        StandardGate::Tdg => StandardGate::T,
        g => g.map_parameter(ParameterExpression::negated),
    }
}

/// Compute the inverse of an instruction.
///
/// Custom gates are inverted through their matrix; measurements have no
/// inverse.
pub fn inverse_instruction(instruction: &Instruction) -> IrResult<Instruction> {
    let kind = match &instruction.kind {
        InstructionKind::Gate(gate) => {
            let kind = match &gate.kind {
                GateKind::Standard(g) => GateKind::Standard(inverse_gate(g)),
                GateKind::Custom(custom) => GateKind::Custom(custom.adjoint()?),
            };
            InstructionKind::Gate(Gate {
                kind,
                label: gate.label.clone(),
            })
        }
        InstructionKind::Measure => return Err(IrError::NotInvertible("measure".into())),
        InstructionKind::Barrier => InstructionKind::Barrier,
    };
    Ok(Instruction {
        kind,
        qubits: instruction.qubits.clone(),
        clbits: instruction.clbits.clone(),
    })
}

/// Check if a gate is self-inverse (Hermitian).
pub fn is_self_inverse(gate: &StandardGate) -> bool {
    matches!(
        gate,
        StandardGate::X
            | StandardGate::Y
            | StandardGate::Z
            | StandardGate::H
            | StandardGate::CX
            | StandardGate::CY
            | StandardGate::CZ
            | StandardGate::CH
            | StandardGate::Swap
            | StandardGate::CCX
            | StandardGate::CSwap
    )
}

impl Circuit {
    /// The adjoint circuit: instructions reversed, each one inverted.
    ///
    /// The result keeps the wires of `self` and is named `<name>_dg`.
    pub fn inverse(&self) -> IrResult<Circuit> {
        let mut inverse = self.empty_like(format!("{}_dg", self.name()));
        let ops: Vec<&Instruction> = self.instructions().collect();
        for inst in ops.into_iter().rev() {
            inverse.append(inverse_instruction(inst)?)?;
        }
        Ok(inverse)
    }
}
