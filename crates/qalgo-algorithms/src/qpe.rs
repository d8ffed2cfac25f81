//! Quantum Phase Estimation.
//!
//! For a unitary `U` with eigenstate `|ψ⟩` and `U|ψ⟩ = e^{2πiθ}|ψ⟩`, the
//! circuit built by [`qpe_circuit`] writes an `n_count`-bit estimate of `θ`
//! into its classical register.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use qalgo_hal::{Backend, Counts};
use qalgo_ir::{Circuit, IrError, QubitId};

use crate::error::{AlgorithmError, AlgorithmResult};
use crate::qft::apply_qft;

/// Most counting qubits [`qpe_circuit`] accepts; the last one repeats `U` 2^(n-1) times.
pub const MAX_COUNTING_QUBITS: u32 = 20;

/// Assemble a phase-estimation circuit.
///
/// Qubits `0..n_count` form the counting register, the following ones hold
/// the eigenstate. Counting qubit `i` controls `2^i` applications of `U` and
/// is measured into classical bit `i`.
///
/// # Errors
///
/// - [`AlgorithmError::InvalidInput`] when `n_count` is zero or too large,
///   or when the eigenstate preparation does not match the unitary's width.
/// - [`AlgorithmError::InvalidOperator`] when `unitary` has an operation
///   without a controlled form.
pub fn qpe_circuit(unitary: &Circuit, eigenstate: &Circuit, n_count: u32) -> AlgorithmResult<Circuit> {
    if n_count == 0 || n_count > MAX_COUNTING_QUBITS {
        return Err(AlgorithmError::InvalidInput(format!(
            "n_count must be between 1 and {MAX_COUNTING_QUBITS}, got {n_count}"
        )));
    }
    if unitary.num_qubits() == 0 {
        return Err(AlgorithmError::InvalidInput("unitary acts on no qubits".into()));
    }
    if eigenstate.num_qubits() != unitary.num_qubits() {
        return Err(AlgorithmError::InvalidInput(format!(
            "eigenstate has {} qubits, unitary has {}",
            eigenstate.num_qubits(),
            unitary.num_qubits()
        )));
    }
    if eigenstate.has_measurements() {
        return Err(AlgorithmError::InvalidInput(
            "eigenstate preparation must not measure".into(),
        ));
    }

    let controlled = unitary.control().map_err(|e| match e {
        IrError::NotControllable(op) | IrError::NotInvertible(op) => {
            AlgorithmError::InvalidOperator(format!("'{}' contains '{op}'", unitary.name()))
        }
        other => AlgorithmError::Ir(other),
    })?;

    let mut circuit = Circuit::new("qpe");
    let counting = circuit.add_qreg("count", n_count);
    let work_width = u32::try_from(unitary.num_qubits())
        .map_err(|_| AlgorithmError::InvalidInput("unitary is too wide".into()))?;
    let work = circuit.add_qreg("work", work_width);
    let clbits = circuit.add_creg("c", n_count);

    for &q in &counting {
        circuit.h(q)?;
    }
    circuit.compose(eigenstate, &work, &[])?;

    for (i, &control) in counting.iter().enumerate() {
        let mut operands = Vec::with_capacity(work.len() + 1);
        operands.push(control);
        operands.extend_from_slice(&work);
        for _ in 0..(1u64 << i) {
            circuit.compose(&controlled, &operands, &[])?;
        }
    }

    circuit.compose(&inverse_qft(n_count)?, &counting, &[])?;
    circuit.measure_qubits(&counting, &clbits)?;
    debug!(
        qubits = circuit.num_qubits(),
        ops = circuit.num_ops(),
        "Assembled phase estimation circuit"
    );
    Ok(circuit)
}

/// Inverse QFT over a register whose qubit `n-1` is the most significant bit.
fn inverse_qft(n: u32) -> AlgorithmResult<Circuit> {
    let mut qft = Circuit::with_size("qft", n, 0);
    let order: Vec<QubitId> = (0..n).rev().map(QubitId).collect();
    apply_qft(&mut qft, &order)?;
    Ok(qft.inverse()?)
}

/// One-qubit unitary `P(2πθ)`, whose eigenstate `|1⟩` has phase `θ`.
pub fn phase_unitary(theta: f64) -> Circuit {
    let mut unitary = Circuit::with_size("u", 1, 0);
    if let Err(e) = unitary.p(2.0 * PI * theta, QubitId(0)) {
        unreachable!("phase gate on fresh qubit failed: {e}");
    }
    unitary
}

/// Estimated phase of one outcome.
///
/// Classical bit `k` (character `k`) carries weight `2^k / 2^n`, that is
/// `int(reverse(bitstring), 2) / 2^n`.
pub fn estimate_phase(bitstring: &str) -> f64 {
    let n = bitstring.chars().count();
    let value: f64 = bitstring
        .chars()
        .enumerate()
        .filter(|&(_, c)| c == '1')
        .map(|(k, _)| 2f64.powi(k as i32))
        .sum();
    value / 2f64.powi(n as i32)
}

/// One distinct outcome of a phase-estimation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseEntry {
    /// Measured bitstring, classical bit 0 first.
    pub outcome: String,
    /// Phase read from the outcome.
    pub phase: f64,
    /// How many shots produced it.
    pub count: u64,
}

/// Outcomes of a phase-estimation run by descending frequency.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhaseReport {
    /// Entries by descending count, ties by ascending bitstring.
    pub entries: Vec<PhaseEntry>,
}

impl PhaseReport {
    /// Build the report for a histogram.
    pub fn from_counts(counts: &Counts) -> Self {
        let entries = counts
            .sorted()
            .into_iter()
            .map(|(outcome, count)| PhaseEntry {
                outcome: outcome.to_string(),
                phase: estimate_phase(outcome),
                count,
            })
            .collect();
        Self { entries }
    }

    /// The most frequent outcome.
    pub fn most_likely(&self) -> Option<&PhaseEntry> {
        self.entries.first()
    }
}

/// Run a phase-estimation circuit and tabulate its phases.
#[instrument(skip(circuit, backend), fields(circuit = circuit.name(), backend = backend.name()))]
pub fn simulate_qpe(
    circuit: &Circuit,
    backend: &dyn Backend,
    shots: u32,
) -> AlgorithmResult<(Counts, PhaseReport)> {
    let result = backend.run(circuit, shots)?;
    let report = PhaseReport::from_counts(&result.counts);
    if let Some(top) = report.most_likely() {
        debug!(outcome = %top.outcome, phase = top.phase, count = top.count, "Most likely phase");
    }
    Ok((result.counts, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use qalgo_ir::{ClbitId, CustomGate};

    fn one_state() -> Circuit {
        let mut prep = Circuit::with_size("prep", 1, 0);
        prep.x(QubitId(0)).unwrap();
        prep
    }

    #[test]
    fn test_estimate_phase_bit_order() {
        assert_eq!(estimate_phase("000"), 0.0);
        assert_eq!(estimate_phase("100"), 0.125);
        assert_eq!(estimate_phase("010"), 0.25);
        assert_eq!(estimate_phase("001"), 0.5);
        assert_eq!(estimate_phase("0010"), 0.25);
    }

    #[test]
    fn test_circuit_shape() {
        let circuit = qpe_circuit(&phase_unitary(0.25), &one_state(), 3).unwrap();
        assert_eq!(circuit.num_qubits(), 4);
        assert_eq!(circuit.num_clbits(), 3);
        // 1 + 2 + 4 controlled applications
        assert_eq!(circuit.count_ops().get("cp"), Some(&(7 + 3)));
        assert!(circuit.has_measurements());
    }

    #[test]
    fn test_zero_counting_qubits() {
        assert!(matches!(
            qpe_circuit(&phase_unitary(0.25), &one_state(), 0),
            Err(AlgorithmError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_width_mismatch() {
        let wide = Circuit::with_size("wide", 2, 0);
        assert!(matches!(
            qpe_circuit(&phase_unitary(0.25), &wide, 2),
            Err(AlgorithmError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_measuring_unitary_is_invalid_operator() {
        let mut unitary = Circuit::with_size("m", 1, 1);
        unitary.measure(QubitId(0), ClbitId(0)).unwrap();
        assert!(matches!(
            qpe_circuit(&unitary, &one_state(), 2),
            Err(AlgorithmError::InvalidOperator(_))
        ));
    }

    #[test]
    fn test_opaque_gate_is_invalid_operator() {
        let mut unitary = Circuit::with_size("oracle", 1, 0);
        unitary.gate(CustomGate::new("black_box", 1), [QubitId(0)]).unwrap();
        assert!(matches!(
            qpe_circuit(&unitary, &one_state(), 2),
            Err(AlgorithmError::InvalidOperator(_))
        ));
    }

    #[test]
    fn test_report_order() {
        let counts = Counts::from_pairs([("010", 5), ("110", 9), ("001", 5)]);
        let report = PhaseReport::from_counts(&counts);
        let outcomes: Vec<_> = report.entries.iter().map(|e| e.outcome.as_str()).collect();
        assert_eq!(outcomes, vec!["110", "001", "010"]);
        assert_eq!(report.most_likely().unwrap().phase, 0.375);
    }
}
