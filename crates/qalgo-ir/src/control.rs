//! Controlled versions of gates and circuits.

use num_complex::Complex64;
use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2, FRAC_PI_4};

use crate::circuit::Circuit;
use crate::error::{IrError, IrResult};
use crate::gate::{CustomGate, Gate, GateKind, StandardGate};
use crate::instruction::{Instruction, InstructionKind};
use crate::parameter::ParameterExpression;
use crate::qubit::QubitId;

/// Controlled form of a standard gate, the control prepended to its operands.
///
/// Single-qubit gates and CX/Swap map onto standard gates (H → CH,
/// T → CP(π/4), CX → CCX, ...). Everything else becomes a matrix gate, which
/// needs concrete angles.
pub fn controlled_gate(gate: &StandardGate) -> IrResult<GateKind> {
    let direct = match gate {
        StandardGate::X => Some(StandardGate::CX),
        StandardGate::Y => Some(StandardGate::CY),
        StandardGate::Z => Some(StandardGate::CZ),
        StandardGate::H => Some(StandardGate::CH),
        StandardGate::S => Some(StandardGate::CP(FRAC_PI_2.into())),
        StandardGate::Sdg => Some(StandardGate::CP((-FRAC_PI_2).into())),
        StandardGate::T => Some(StandardGate::CP(FRAC_PI_4.into())),
        StandardGate::Tdg => Some(StandardGate::CP((-FRAC_PI_4).into())),
        StandardGate::Rx(p) => Some(StandardGate::CRx(p.clone())),
        StandardGate::Ry(p) => Some(StandardGate::CRy(p.clone())),
        StandardGate::Rz(p) => Some(StandardGate::CRz(p.clone())),
        StandardGate::P(p) => Some(StandardGate::CP(p.clone())),
        StandardGate::CX => Some(StandardGate::CCX),
        StandardGate::Swap => Some(StandardGate::CSwap),
        _ => None,
    };
    match direct {
        Some(g) => Ok(GateKind::Standard(g)),
        None => Ok(GateKind::Custom(standard_matrix(gate)?.controlled()?)),
    }
}

/// Matrix form of a standard gate, in the operand bit order of [`CustomGate`].
pub fn standard_matrix(gate: &StandardGate) -> IrResult<CustomGate> {
    let angle = |p: &ParameterExpression| {
        p.as_f64()
            .ok_or_else(|| IrError::NotControllable(format!("{}({p})", gate.name())))
    };
    let base: Vec<Complex64> = match gate {
        StandardGate::X | StandardGate::CX | StandardGate::CCX => pauli_x(),
        StandardGate::Y | StandardGate::CY => vec![c(0.0, 0.0), c(0.0, -1.0), c(0.0, 1.0), c(0.0, 0.0)],
        StandardGate::Z | StandardGate::CZ => phase(std::f64::consts::PI),
        StandardGate::H | StandardGate::CH => {
            let h = FRAC_1_SQRT_2;
            vec![c(h, 0.0), c(h, 0.0), c(h, 0.0), c(-h, 0.0)]
        }
        StandardGate::S => phase(FRAC_PI_2),
        StandardGate::Sdg => phase(-FRAC_PI_2),
        StandardGate::T => phase(FRAC_PI_4),
        StandardGate::Tdg => phase(-FRAC_PI_4),
        StandardGate::P(p) | StandardGate::CP(p) => phase(angle(p)?),
        StandardGate::Rx(p) | StandardGate::CRx(p) => {
            let (cos, sin) = half_angle(angle(p)?);
            vec![c(cos, 0.0), c(0.0, -sin), c(0.0, -sin), c(cos, 0.0)]
        }
        StandardGate::Ry(p) | StandardGate::CRy(p) => {
            let (cos, sin) = half_angle(angle(p)?);
            vec![c(cos, 0.0), c(-sin, 0.0), c(sin, 0.0), c(cos, 0.0)]
        }
        StandardGate::Rz(p) | StandardGate::CRz(p) => {
            let (cos, sin) = half_angle(angle(p)?);
            vec![c(cos, -sin), c(0.0, 0.0), c(0.0, 0.0), c(cos, sin)]
        }
        StandardGate::Swap | StandardGate::CSwap => {
            let mut m = vec![c(0.0, 0.0); 16];
            for (row, col) in [(0, 0), (1, 2), (2, 1), (3, 3)] {
                m[row * 4 + col] = c(1.0, 0.0);
            }
            m
        }
    };
    let width = if base.len() == 16 { 2 } else { 1 };
    let mut matrix = CustomGate::new(gate.name(), width).with_matrix(base)?;
    for _ in 0..gate.num_controls() {
        matrix = matrix.controlled()?;
    }
    matrix.name = gate.name().to_string();
    Ok(matrix)
}

fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

fn pauli_x() -> Vec<Complex64> {
    vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 0.0), c(0.0, 0.0)]
}

fn phase(theta: f64) -> Vec<Complex64> {
    vec![c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), Complex64::from_polar(1.0, theta)]
}

fn half_angle(theta: f64) -> (f64, f64) {
    ((theta / 2.0).cos(), (theta / 2.0).sin())
}

impl Circuit {
    /// Controlled version of this circuit.
    ///
    /// The result has one extra qubit: qubit 0 is the control and qubit k of
    /// `self` becomes qubit k+1. Measurements and custom gates without a
    /// matrix cannot be controlled.
    pub fn control(&self) -> IrResult<Circuit> {
        let mut controlled = Circuit::new(format!("c-{}", self.name()));
        let ctrl = controlled.add_qreg("ctrl", 1)[0];
        let targets: Vec<QubitId> = (0..self.num_qubits())
            .map(|_| controlled.add_qubit())
            .collect();

        for inst in self.instructions() {
            if inst.is_measure() {
                return Err(IrError::NotControllable("measure".into()));
            }
            let mapped = inst.remapped(&targets, &[])?;
            let next = match &inst.kind {
                InstructionKind::Gate(gate) => {
                    let kind = match &gate.kind {
                        GateKind::Standard(g) => controlled_gate(g)?,
                        GateKind::Custom(custom) => GateKind::Custom(custom.controlled()?),
                    };
                    let mut qubits: Vec<QubitId> = vec![ctrl];
                    qubits.extend(mapped.qubits);
                    Instruction {
                        kind: InstructionKind::Gate(Gate {
                            kind,
                            label: gate.label.clone(),
                        }),
                        qubits,
                        clbits: vec![],
                    }
                }
                InstructionKind::Measure | InstructionKind::Barrier => mapped,
            };
            controlled.append(next)?;
        }
        Ok(controlled)
    }
}
