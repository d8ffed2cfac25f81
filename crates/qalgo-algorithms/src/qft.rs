//! Quantum Fourier Transform.

use std::f64::consts::PI;

use qalgo_ir::{Circuit, IrResult, QubitId};

/// Apply the QFT to `qubits`, in the given order, inside `circuit`.
///
/// Qubit `qubits[0]` is treated as the most significant bit: it gets the
/// first Hadamard and the full ladder of controlled phases
/// `CP(π/2^(j-i))` from every later qubit, and the register is reversed
/// by swaps at the end.
pub fn apply_qft<'a>(circuit: &'a mut Circuit, qubits: &[QubitId]) -> IrResult<&'a mut Circuit> {
    circuit.check_wires(qubits, &[], Some("qft".into()))?;
    let n = qubits.len();
    for i in 0..n {
        circuit.h(qubits[i])?;
        for j in (i + 1)..n {
            let angle = PI / 2f64.powi((j - i) as i32);
            circuit.cp(angle, qubits[j], qubits[i])?;
        }
    }
    for i in 0..n / 2 {
        circuit.swap(qubits[i], qubits[n - 1 - i])?;
    }
    Ok(circuit)
}

/// A standalone `n`-qubit QFT named `qft`.
pub fn create_qft_circuit(n: u32) -> Circuit {
    let mut circuit = Circuit::with_size("qft", n, 0);
    let qubits = QubitId::range(n);
    // Every operand is one of the circuit's own distinct qubits.
    if let Err(e) = apply_qft(&mut circuit, &qubits) {
        unreachable!("QFT on fresh register failed: {e}");
    }
    circuit
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use qalgo_ir::{IrError, StandardGate};

    #[test]
    fn test_three_qubit_qft() {
        let circuit = create_qft_circuit(3);
        assert_eq!(circuit.name(), "qft");
        assert_eq!(circuit.num_qubits(), 3);
        assert_eq!(circuit.num_clbits(), 0);
        assert!(circuit.depth() > 0);

        let angles: Vec<f64> = circuit
            .instructions()
            .filter_map(|i| match i.as_standard() {
                Some(StandardGate::CP(p)) => p.as_f64(),
                _ => None,
            })
            .collect();
        assert_eq!(angles.len(), 3);
        assert!((angles[0] - PI / 2.0).abs() < 1e-12);
        assert!((angles[1] - PI / 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_trivial_registers() {
        assert_eq!(create_qft_circuit(0).num_ops(), 0);
        let single = create_qft_circuit(1);
        assert_eq!(single.count_ops().get("h"), Some(&1));
        assert_eq!(single.num_ops(), 1);
    }

    #[test]
    fn test_qft_on_subset_in_custom_order() {
        let mut circuit = Circuit::with_size("host", 4, 0);
        apply_qft(&mut circuit, &[QubitId(3), QubitId(1)]).unwrap();
        let first = circuit.instructions().next().unwrap();
        assert_eq!(first.qubits, vec![QubitId(3)]);
        let cp = circuit.instructions().nth(1).unwrap();
        assert_eq!(cp.qubits, vec![QubitId(1), QubitId(3)]);
    }

    #[test]
    fn test_out_of_range_qubit() {
        let mut circuit = Circuit::with_size("small", 2, 0);
        let err = apply_qft(&mut circuit, &[QubitId(0), QubitId(5)]).unwrap_err();
        assert!(matches!(err, IrError::QubitNotFound { qubit: QubitId(5), .. }));
        assert_eq!(circuit.num_ops(), 0);
    }

    #[test]
    fn test_repeated_qubit_adds_nothing() {
        let mut circuit = Circuit::with_size("small", 2, 0);
        circuit.x(QubitId(1)).unwrap();
        let err = apply_qft(&mut circuit, &[QubitId(0), QubitId(1), QubitId(0)]).unwrap_err();
        assert!(matches!(err, IrError::DuplicateQubit { qubit: QubitId(0), .. }));
        assert_eq!(circuit.num_ops(), 1);
    }

    proptest! {
        #[test]
        fn prop_gate_counts(n in 1u32..12) {
            let counts = create_qft_circuit(n).count_ops();
            let n = n as usize;
            prop_assert_eq!(counts.get("h").copied().unwrap_or(0), n);
            prop_assert_eq!(counts.get("cp").copied().unwrap_or(0), n * (n - 1) / 2);
            prop_assert_eq!(counts.get("swap").copied().unwrap_or(0), n / 2);
        }
    }
}
