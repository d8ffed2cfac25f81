//! Statevector simulation engine.
//!
//! Bit `i` of a basis index is the state of qubit `i`.

use num_complex::Complex64;
use rand::Rng;
use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2, FRAC_PI_4};

use qalgo_hal::{HalError, HalResult};
use qalgo_ir::{CustomGate, GateKind, Instruction, InstructionKind, ParameterExpression, StandardGate};

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);

/// Row-major 2x2 unitary.
type Matrix2 = [Complex64; 4];

/// A statevector representing a quantum state.
#[derive(Debug, Clone)]
pub struct Statevector {
    amplitudes: Vec<Complex64>,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let mut amplitudes = vec![ZERO; 1 << num_qubits];
        amplitudes[0] = ONE;
        Self { amplitudes }
    }

    /// Consume the state and return its amplitudes.
    pub fn into_amplitudes(self) -> Vec<Complex64> {
        self.amplitudes
    }

    /// Apply one instruction. Measurements and barriers leave the state alone.
    pub fn apply(&mut self, instruction: &Instruction) -> HalResult<()> {
        let InstructionKind::Gate(gate) = &instruction.kind else {
            return Ok(());
        };
        let qubits: Vec<usize> = instruction.qubits.iter().map(|q| q.index()).collect();
        match &gate.kind {
            GateKind::Standard(g) => self.apply_standard(g, &qubits),
            GateKind::Custom(g) => self.apply_custom(g, &qubits),
        }
    }

    fn apply_standard(&mut self, gate: &StandardGate, qubits: &[usize]) -> HalResult<()> {
        let angle = |p: &ParameterExpression| {
            p.as_f64().ok_or_else(|| {
                HalError::InvalidCircuit(format!("gate '{}' has unbound parameter {p}", gate.name()))
            })
        };
        let matrix = match gate {
            StandardGate::X | StandardGate::CX | StandardGate::CCX => pauli_x(),
            StandardGate::Y | StandardGate::CY => {
                [ZERO, Complex64::new(0.0, -1.0), Complex64::new(0.0, 1.0), ZERO]
            }
            StandardGate::Z | StandardGate::CZ => phase(std::f64::consts::PI),
            StandardGate::H | StandardGate::CH => {
                let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
                [h, h, h, -h]
            }
            StandardGate::S => phase(FRAC_PI_2),
            StandardGate::Sdg => phase(-FRAC_PI_2),
            StandardGate::T => phase(FRAC_PI_4),
            StandardGate::Tdg => phase(-FRAC_PI_4),
            StandardGate::Rx(p) | StandardGate::CRx(p) => rx(angle(p)?),
            StandardGate::Ry(p) | StandardGate::CRy(p) => ry(angle(p)?),
            StandardGate::Rz(p) | StandardGate::CRz(p) => rz(angle(p)?),
            StandardGate::P(p) | StandardGate::CP(p) => phase(angle(p)?),
            StandardGate::Swap => {
                self.apply_swap(0, qubits[0], qubits[1]);
                return Ok(());
            }
            StandardGate::CSwap => {
                self.apply_swap(1 << qubits[0], qubits[1], qubits[2]);
                return Ok(());
            }
        };
        let (controls, target) = qubits.split_at(qubits.len() - 1);
        let control_mask = controls.iter().fold(0usize, |m, &q| m | (1usize << q));
        self.apply_controlled_1q(control_mask, target[0], &matrix);
        Ok(())
    }

    /// Apply `matrix` to `target` on every basis state where all `control_mask` bits are set.
    fn apply_controlled_1q(&mut self, control_mask: usize, target: usize, matrix: &Matrix2) {
        let tgt_mask = 1 << target;
        for i in 0..self.amplitudes.len() {
            if i & tgt_mask == 0 && i & control_mask == control_mask {
                let j = i | tgt_mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = matrix[0] * a + matrix[1] * b;
                self.amplitudes[j] = matrix[2] * a + matrix[3] * b;
            }
        }
    }

    fn apply_swap(&mut self, control_mask: usize, q1: usize, q2: usize) {
        let mask1 = 1 << q1;
        let mask2 = 1 << q2;
        for i in 0..self.amplitudes.len() {
            if i & control_mask == control_mask && i & mask1 != 0 && i & mask2 == 0 {
                let j = (i & !mask1) | mask2;
                self.amplitudes.swap(i, j);
            }
        }
    }

    /// Apply a dense k-qubit matrix; bit `k` of a row index is operand `k`.
    fn apply_custom(&mut self, gate: &CustomGate, qubits: &[usize]) -> HalResult<()> {
        let matrix = gate.matrix.as_ref().ok_or_else(|| {
            HalError::InvalidCircuit(format!("custom gate '{}' has no matrix", gate.name))
        })?;
        let dim = 1 << qubits.len();
        if matrix.len() != dim * dim {
            return Err(HalError::InvalidCircuit(format!(
                "custom gate '{}' matrix has {} entries for {} operands",
                gate.name,
                matrix.len(),
                qubits.len()
            )));
        }

        let operand_mask = qubits.iter().fold(0usize, |m, &q| m | (1usize << q));
        let offsets: Vec<usize> = (0..dim)
            .map(|local| {
                qubits
                    .iter()
                    .enumerate()
                    .filter(|&(k, _)| local & (1usize << k) != 0)
                    .fold(0usize, |acc, (_, &q)| acc | (1usize << q))
            })
            .collect();

        let mut gathered = vec![ZERO; dim];
        for base in 0..self.amplitudes.len() {
            if base & operand_mask != 0 {
                continue;
            }
            for (slot, offset) in gathered.iter_mut().zip(&offsets) {
                *slot = self.amplitudes[base | offset];
            }
            for (row, offset) in offsets.iter().enumerate() {
                let row_entries = &matrix[row * dim..(row + 1) * dim];
                self.amplitudes[base | offset] = row_entries
                    .iter()
                    .zip(&gathered)
                    .map(|(m, a)| m * a)
                    .sum();
            }
        }
        Ok(())
    }

    /// Cumulative probability of basis states `0..=i`, for repeated sampling.
    pub fn cumulative(&self) -> Vec<f64> {
        self.amplitudes
            .iter()
            .scan(0.0, |acc, amp| {
                *acc += amp.norm_sqr();
                Some(*acc)
            })
            .collect()
    }
}

/// Draw one basis index from a cumulative distribution.
pub fn sample_index(cumulative: &[f64], rng: &mut impl Rng) -> usize {
    let total = cumulative.last().copied().unwrap_or(1.0);
    let r: f64 = rng.r#gen::<f64>() * total;
    cumulative
        .partition_point(|&c| c <= r)
        .min(cumulative.len().saturating_sub(1))
}

fn pauli_x() -> Matrix2 {
    [ZERO, ONE, ONE, ZERO]
}

fn phase(theta: f64) -> Matrix2 {
    [ONE, ZERO, ZERO, Complex64::from_polar(1.0, theta)]
}

fn rx(theta: f64) -> Matrix2 {
    let (c, s) = ((theta / 2.0).cos(), (theta / 2.0).sin());
    let neg_i_s = Complex64::new(0.0, -s);
    [Complex64::new(c, 0.0), neg_i_s, neg_i_s, Complex64::new(c, 0.0)]
}

fn ry(theta: f64) -> Matrix2 {
    let (c, s) = ((theta / 2.0).cos(), (theta / 2.0).sin());
    [
        Complex64::new(c, 0.0),
        Complex64::new(-s, 0.0),
        Complex64::new(s, 0.0),
        Complex64::new(c, 0.0),
    ]
}

fn rz(theta: f64) -> Matrix2 {
    [
        Complex64::from_polar(1.0, -theta / 2.0),
        ZERO,
        ZERO,
        Complex64::from_polar(1.0, theta / 2.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use qalgo_ir::{Circuit, QubitId};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::f64::consts::PI;

    fn approx_eq(a: Complex64, b: Complex64) -> bool {
        (a - b).norm() < 1e-10
    }

    fn run(circuit: &Circuit) -> Statevector {
        let mut sv = Statevector::new(circuit.num_qubits());
        for inst in circuit.instructions() {
            sv.apply(inst).unwrap();
        }
        sv
    }

    #[test]
    fn test_initial_state() {
        let sv = Statevector::new(2);
        assert!(approx_eq(sv.amplitudes[0], ONE));
        assert!(sv.amplitudes[1..].iter().all(|a| approx_eq(*a, ZERO)));
    }

    #[test]
    fn test_bell_state() {
        let mut circuit = Circuit::with_size("bell", 2, 0);
        circuit.h(QubitId(0)).unwrap().cx(QubitId(0), QubitId(1)).unwrap();
        let sv = run(&circuit);

        let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
        assert!(approx_eq(sv.amplitudes[0], h));
        assert!(approx_eq(sv.amplitudes[1], ZERO));
        assert!(approx_eq(sv.amplitudes[2], ZERO));
        assert!(approx_eq(sv.amplitudes[3], h));
    }

    #[test]
    fn test_controlled_phase_only_on_11() {
        let mut circuit = Circuit::with_size("cp", 2, 0);
        circuit
            .x(QubitId(0))
            .unwrap()
            .x(QubitId(1))
            .unwrap()
            .cp(PI / 2.0, QubitId(0), QubitId(1))
            .unwrap();
        let sv = run(&circuit);
        assert!(approx_eq(sv.amplitudes[3], Complex64::new(0.0, 1.0)));
    }

    #[test]
    fn test_swap_moves_excitation() {
        let mut circuit = Circuit::with_size("swap", 3, 0);
        circuit.x(QubitId(0)).unwrap().swap(QubitId(0), QubitId(2)).unwrap();
        let sv = run(&circuit);
        assert!(approx_eq(sv.amplitudes[0b100], ONE));
    }

    #[test]
    fn test_custom_permutation_matches_cx() {
        // |c t> with c = operand 0: CX maps 01 -> 11 in operand bit order.
        let cx = CustomGate::permutation("cx_perm", 2, &[0, 3, 2, 1]).unwrap();
        let mut custom = Circuit::with_size("custom", 3, 0);
        custom.x(QubitId(2)).unwrap().gate(cx, [QubitId(2), QubitId(0)]).unwrap();

        let mut native = Circuit::with_size("native", 3, 0);
        native.x(QubitId(2)).unwrap().cx(QubitId(2), QubitId(0)).unwrap();

        let a = run(&custom);
        let b = run(&native);
        for (x, y) in a.amplitudes.iter().zip(&b.amplitudes) {
            assert!(approx_eq(*x, *y));
        }
    }

    #[test]
    fn test_controlled_custom_gate_respects_control() {
        let flip = CustomGate::permutation("flip", 1, &[1, 0]).unwrap().controlled().unwrap();
        let mut off = Circuit::with_size("off", 2, 0);
        off.gate(flip.clone(), [QubitId(0), QubitId(1)]).unwrap();
        assert!(approx_eq(run(&off).amplitudes[0], ONE));

        let mut on = Circuit::with_size("on", 2, 0);
        on.x(QubitId(0)).unwrap().gate(flip, [QubitId(0), QubitId(1)]).unwrap();
        assert!(approx_eq(run(&on).amplitudes[0b11], ONE));
    }

    #[test]
    fn test_unbound_parameter_rejected() {
        let mut circuit = Circuit::with_size("sym", 1, 0);
        circuit.rx(ParameterExpression::symbol("theta"), QubitId(0)).unwrap();
        let mut sv = Statevector::new(1);
        let inst = circuit.instructions().next().unwrap();
        assert!(matches!(sv.apply(inst), Err(HalError::InvalidCircuit(_))));
    }

    #[test]
    fn test_sample_deterministic() {
        let mut circuit = Circuit::with_size("one", 1, 0);
        circuit.x(QubitId(0)).unwrap();
        let cumulative = run(&circuit).cumulative();

        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            assert_eq!(sample_index(&cumulative, &mut rng), 1);
        }
    }
}
