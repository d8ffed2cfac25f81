//! End-to-end tests of the statevector backend through the HAL trait.

use std::f64::consts::PI;

use qalgo_adapter_sim::{BACKEND_NAME, SimulatorBackend, register};
use qalgo_hal::{Backend, BackendConfig, BackendRegistry};
use qalgo_ir::{Circuit, ClbitId, QubitId};

fn fourier_ladder(n: u32) -> Circuit {
    let mut circuit = Circuit::with_size("ladder", n, 0);
    for i in 0..n {
        circuit.h(QubitId(i)).unwrap();
        for j in (i + 1)..n {
            circuit
                .cp(PI / f64::from(1u32 << (j - i)), QubitId(j), QubitId(i))
                .unwrap();
        }
    }
    circuit
}

#[test]
fn test_ghz_state() {
    let backend = SimulatorBackend::new().with_seed(5);
    let result = backend.run(&Circuit::ghz(3).unwrap(), 1000).unwrap();
    let counts = &result.counts;
    assert_eq!(counts.get("000") + counts.get("111"), 1000);
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let circuit = Circuit::ghz(4).unwrap();
    let first = SimulatorBackend::new().with_seed(1234).run(&circuit, 500).unwrap();
    let second = SimulatorBackend::new().with_seed(1234).run(&circuit, 500).unwrap();
    assert_eq!(first.counts, second.counts);
    assert_eq!(first.metadata["seed"], 1234);
}

#[test]
fn test_circuit_then_inverse_is_identity() {
    let mut circuit = Circuit::with_size("roundtrip", 4, 0);
    circuit.x(QubitId(1)).unwrap().x(QubitId(3)).unwrap();
    let ladder = fourier_ladder(4);
    let targets = QubitId::range(4);
    circuit.compose(&ladder, &targets, &[]).unwrap();
    circuit.compose(&ladder.inverse().unwrap(), &targets, &[]).unwrap();

    let amplitudes = SimulatorBackend::new().statevector(&circuit).unwrap();
    let expected = 0b1010;
    for (index, amp) in amplitudes.iter().enumerate() {
        let target = if index == expected { 1.0 } else { 0.0 };
        assert!((amp.norm() - target).abs() < 1e-6, "index {index}: {amp}");
    }
}

#[test]
fn test_partial_measurement_width() {
    let mut circuit = Circuit::with_size("partial", 3, 1);
    circuit.x(QubitId(2)).unwrap();
    circuit.measure(QubitId(2), ClbitId(0)).unwrap();

    let result = SimulatorBackend::new().run(&circuit, 10).unwrap();
    assert_eq!(result.counts.get("1"), 10);
    assert_eq!(result.counts.len(), 1);
}

#[test]
fn test_registry_creates_configured_simulator() {
    let mut registry = BackendRegistry::new();
    register(&mut registry);
    assert!(registry.has_backend(BACKEND_NAME));

    let backend = registry
        .create(BackendConfig::new(BACKEND_NAME).with_seed(9).with_max_qubits(3))
        .unwrap();
    assert_eq!(backend.name(), BACKEND_NAME);
    assert_eq!(backend.capabilities().num_qubits, 3);
    assert!(backend.run(&Circuit::ghz(4).unwrap(), 10).is_err());
}
