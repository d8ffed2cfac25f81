//! End-to-end runs of the routines on the statevector simulator.

use qalgo_adapter_sim::SimulatorBackend;
use qalgo_algorithms::{
    AlgorithmError, FactorMethod, QuadraticProgram, QuboOptions, ShorOptions, create_qft_circuit,
    estimate_phase, factor_integer, phase_unitary, qpe_circuit, simple_qubo_problem, simulate_qpe,
    solve_qubo,
};
use qalgo_hal::{Backend, HalError};
use qalgo_ir::{Circuit, QubitId};

fn one_state() -> Circuit {
    let mut prep = Circuit::with_size("one", 1, 0);
    prep.x(QubitId(0)).unwrap();
    prep
}

#[test]
fn test_shor_factors_15() {
    let backend = SimulatorBackend::new().with_seed(11);
    let report = factor_integer(15, &backend, &ShorOptions::default()).unwrap();
    assert_eq!(report.factors, vec![3, 5]);
    assert_eq!(report.method, FactorMethod::OrderFinding);
    assert_eq!(report.order, Some(4));
}

#[test]
fn test_shor_factors_21() {
    let backend = SimulatorBackend::new().with_seed(21);
    let report = factor_integer(21, &backend, &ShorOptions::default()).unwrap();
    assert_eq!(report.factors, vec![3, 7]);
    for f in &report.factors {
        assert_eq!(21 % f, 0);
    }
}

#[test]
fn test_shor_classical_shortcuts() {
    let backend = SimulatorBackend::new().with_seed(3);
    let options = ShorOptions::default();

    let even = factor_integer(22, &backend, &options).unwrap();
    assert_eq!((even.factors, even.method), (vec![2, 11], FactorMethod::Even));

    let prime = factor_integer(13, &backend, &options).unwrap();
    assert!(prime.factors.is_empty());

    let power = factor_integer(27, &backend, &options).unwrap();
    assert_eq!((power.factors, power.method), (vec![3], FactorMethod::PerfectPower));
}

#[test]
fn test_shor_rejects_trivial_inputs() {
    let backend = SimulatorBackend::new();
    for n in [0, 1] {
        assert!(matches!(
            factor_integer(n, &backend, &ShorOptions::default()),
            Err(AlgorithmError::InvalidInput(_))
        ));
    }
}

#[test]
fn test_shor_too_wide_for_backend() {
    let backend = SimulatorBackend::new().with_max_qubits(10);
    let err = factor_integer(21, &backend, &ShorOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        AlgorithmError::Backend(HalError::CircuitTooLarge { qubits: 15, max: 10 })
    ));
}

#[test]
fn test_qpe_exact_phase() {
    let backend = SimulatorBackend::new().with_seed(4);
    let circuit = qpe_circuit(&phase_unitary(0.125), &one_state(), 4).unwrap();
    let (counts, report) = simulate_qpe(&circuit, &backend, 1024).unwrap();

    assert_eq!(counts.len(), 1);
    let top = report.most_likely().unwrap();
    assert_eq!(top.outcome, "0100");
    assert_eq!(top.phase, 0.125);
    assert_eq!(top.count, 1024);
}

#[test]
fn test_qpe_quarter_phase_three_bits() {
    let backend = SimulatorBackend::new().with_seed(9);
    let circuit = qpe_circuit(&phase_unitary(0.25), &one_state(), 3).unwrap();
    let (_, report) = simulate_qpe(&circuit, &backend, 256).unwrap();
    assert!((report.most_likely().unwrap().phase - 0.25).abs() < 1e-12);
}

#[test]
fn test_qpe_inexact_phase_within_resolution() {
    let theta = 0.3;
    let n = 5;
    let backend = SimulatorBackend::new().with_seed(17);
    let circuit = qpe_circuit(&phase_unitary(theta), &one_state(), n).unwrap();
    let (_, report) = simulate_qpe(&circuit, &backend, 2048).unwrap();

    let estimate = report.most_likely().unwrap().phase;
    assert!((estimate - theta).abs() <= 1.0 / f64::from(1u32 << n));
    let total: u64 = report.entries.iter().map(|e| e.count).sum();
    assert_eq!(total, 2048);
    for entry in &report.entries {
        assert_eq!(entry.phase, estimate_phase(&entry.outcome));
    }
}

#[test]
fn test_qft_then_inverse_restores_state() {
    let backend = SimulatorBackend::new();
    let mut circuit = Circuit::with_size("roundtrip", 3, 0);
    circuit.x(QubitId(0)).unwrap().h(QubitId(2)).unwrap();
    let qft = create_qft_circuit(3);
    let before = backend.statevector(&circuit).unwrap();

    circuit.compose(&qft, &circuit.qubit_ids(), &[]).unwrap();
    circuit
        .compose(&qft.inverse().unwrap(), &circuit.qubit_ids(), &[])
        .unwrap();
    let after = backend.statevector(&circuit).unwrap();

    for (a, b) in before.iter().zip(&after) {
        assert!((a - b).norm() < 1e-9);
    }
}

#[test]
fn test_qft_of_zero_state_is_uniform() {
    let backend = SimulatorBackend::new();
    let state = backend.statevector(&create_qft_circuit(4)).unwrap();
    for amplitude in state {
        assert!((amplitude.norm_sqr() - 1.0 / 16.0).abs() < 1e-12);
    }
}

#[test]
fn test_qubo_demo_reaches_optimum() {
    let backend = SimulatorBackend::new().with_seed(42);
    let options = QuboOptions {
        max_iterations: 30,
        ..QuboOptions::default()
    };
    let result = solve_qubo(&simple_qubo_problem(), &backend, &options).unwrap();

    let bits = result.assignment_bits();
    assert_eq!(bits.len(), 2);
    assert!(bits.iter().all(|&b| b <= 1));
    assert_eq!(bits[0], bits[1]);
    assert_eq!(result.objective_value, 0.0);
    assert_eq!(result.assignment[0].0, "x0");
    assert_eq!(result.optimal_parameters.len(), 2);
}

#[test]
fn test_qubo_prefers_unique_minimum() {
    // minimize -x0 + x1: optimum at x0=1, x1=0
    let mut problem = QuadraticProgram::new("unique");
    problem.binary_var("x0").unwrap();
    problem.binary_var("x1").unwrap();
    problem.add_linear("x0", -1.0).unwrap().add_linear("x1", 1.0).unwrap();

    let backend = SimulatorBackend::new().with_seed(8);
    let result = solve_qubo(&problem, &backend, &QuboOptions::default()).unwrap();
    assert_eq!(result.assignment_bits(), vec![1, 0]);
    assert_eq!(result.objective_value, -1.0);
}

#[test]
fn test_qubo_empty_problem() {
    let backend = SimulatorBackend::new();
    let err = solve_qubo(&QuadraticProgram::new("empty"), &backend, &QuboOptions::default())
        .unwrap_err();
    assert!(matches!(err, AlgorithmError::InvalidInput(_)));
}

#[test]
fn test_reports_serialize() {
    let backend = SimulatorBackend::new().with_seed(2);
    let report = factor_integer(15, &backend, &ShorOptions::default()).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["n"], 15);
    assert_eq!(json["method"], "OrderFinding");
    assert!(backend.capabilities().is_simulator);
}
