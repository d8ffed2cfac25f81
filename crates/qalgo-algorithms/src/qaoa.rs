//! QAOA for QUBO problems.
//!
//! The ansatz alternates a cost layer `exp(-iγH)` for the Ising form of the
//! problem with an `Rx(2β)` mixer on every qubit. Angles stay symbolic
//! (`gamma_k`, `beta_k`) so the circuit is built once and rebound on every
//! optimizer step.

use std::f64::consts::PI;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use qalgo_hal::{Backend, Counts, HalError};
use qalgo_ir::{Circuit, ParameterExpression, QubitId};

use crate::error::{AlgorithmError, AlgorithmResult};
use crate::optimizer::{Cobyla, Optimizer};
use crate::qubo::{IsingModel, QuadraticProgram};

/// Strategy for the starting angles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitStrategy {
    /// γ ramps up and β ramps down linearly over the layers.
    Linear,
    /// Discretised adiabatic schedule.
    #[default]
    TrotterizedAdiabatic,
}

/// Options for [`solve_qubo`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuboOptions {
    /// Number of cost/mixer layers `p`.
    pub layers: usize,
    /// Shots per expectation estimate and for the final sample.
    pub shots: u32,
    /// Optimizer iteration limit.
    pub max_iterations: usize,
    /// Starting angles.
    pub init: InitStrategy,
}

impl Default for QuboOptions {
    fn default() -> Self {
        Self {
            layers: 1,
            shots: 1024,
            max_iterations: 100,
            init: InitStrategy::default(),
        }
    }
}

/// Solution returned by [`solve_qubo`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuboResult {
    /// `(variable, value)` in variable order.
    pub assignment: Vec<(String, u8)>,
    /// Objective of `assignment`.
    pub objective_value: f64,
    /// `[γ_0..γ_p, β_0..β_p]` after optimisation.
    pub optimal_parameters: Vec<f64>,
    /// Optimizer iterations spent.
    pub iterations: usize,
    /// Final sampled histogram.
    pub counts: Counts,
    /// Wall-clock time in seconds.
    pub elapsed_secs: f64,
}

impl QuboResult {
    /// Assignment as a 0/1 vector in variable order.
    pub fn assignment_bits(&self) -> Vec<u8> {
        self.assignment.iter().map(|(_, bit)| *bit).collect()
    }
}

/// Symbol names of layer `k`.
fn gamma(k: usize) -> String {
    format!("gamma_{k}")
}

fn beta(k: usize) -> String {
    format!("beta_{k}")
}

/// Build the `p`-layer ansatz for `ising`, measured into clbit `i` per qubit `i`.
pub fn qaoa_ansatz(ising: &IsingModel, layers: usize) -> AlgorithmResult<Circuit> {
    let n = u32::try_from(ising.fields.len())
        .map_err(|_| AlgorithmError::InvalidInput("too many variables".into()))?;
    let mut circuit = Circuit::with_size("qaoa", n, 0);

    for q in 0..n {
        circuit.h(QubitId(q))?;
    }
    for k in 0..layers {
        let g = ParameterExpression::symbol(gamma(k));
        for (i, &h) in ising.fields.iter().enumerate() {
            if h != 0.0 {
                circuit.rz(g.clone() * ParameterExpression::constant(2.0 * h), QubitId(i as u32))?;
            }
        }
        for &(i, j, coupling) in &ising.couplings {
            let (a, b) = (QubitId(i as u32), QubitId(j as u32));
            circuit.cx(a, b)?;
            circuit.rz(g.clone() * ParameterExpression::constant(2.0 * coupling), b)?;
            circuit.cx(a, b)?;
        }
        let mixer = ParameterExpression::symbol(beta(k)) * ParameterExpression::constant(2.0);
        for q in 0..n {
            circuit.rx(mixer.clone(), QubitId(q))?;
        }
    }
    circuit.measure_all()?;
    Ok(circuit)
}

/// Starting angles laid out as `[γ_0..γ_p, β_0..β_p]`.
pub fn initial_parameters(layers: usize, strategy: InitStrategy) -> Vec<f64> {
    let p = layers as f64;
    let (gammas, betas): (Vec<f64>, Vec<f64>) = match strategy {
        InitStrategy::Linear => (0..layers)
            .map(|i| {
                let i = i as f64;
                (PI / 4.0 * (i + 1.0) / p, PI / 4.0 * (p - i) / p)
            })
            .unzip(),
        InitStrategy::TrotterizedAdiabatic => {
            let dt = 1.0 / (p + 1.0);
            (1..=layers)
                .map(|i| {
                    let s = i as f64 * dt;
                    (s * PI / 2.0 * dt, (1.0 - s) * PI / 2.0 * dt)
                })
                .unzip()
        }
    };
    gammas.into_iter().chain(betas).collect()
}

/// Bitstring to assignment; character `i` is variable `i`.
fn parse_assignment(bitstring: &str) -> Vec<u8> {
    bitstring.chars().map(|c| u8::from(c == '1')).collect()
}

/// Minimise `problem` with QAOA on `backend`.
///
/// Angles are tuned with [`Cobyla`] against the sampled expectation of the
/// objective. The returned assignment is the lowest-objective outcome of a
/// final sample at the tuned angles, ties going to the more frequent one.
///
/// # Errors
///
/// - [`AlgorithmError::InvalidInput`] for a problem without variables or zero layers.
/// - [`AlgorithmError::Backend`] when the ansatz does not fit or fails to run.
#[instrument(skip_all, fields(problem = problem.name(), backend = backend.name()))]
pub fn solve_qubo(
    problem: &QuadraticProgram,
    backend: &dyn Backend,
    options: &QuboOptions,
) -> AlgorithmResult<QuboResult> {
    if problem.num_variables() == 0 {
        return Err(AlgorithmError::InvalidInput(format!(
            "problem '{}' has no variables",
            problem.name()
        )));
    }
    if options.layers == 0 {
        return Err(AlgorithmError::InvalidInput("QAOA needs at least one layer".into()));
    }
    let max = backend.capabilities().num_qubits as usize;
    if problem.num_variables() > max {
        return Err(HalError::CircuitTooLarge {
            qubits: problem.num_variables(),
            max,
        }
        .into());
    }

    let start = Instant::now();
    let ansatz = qaoa_ansatz(&problem.to_ising(), options.layers)?;
    let symbols: Vec<String> = (0..options.layers)
        .map(gamma)
        .chain((0..options.layers).map(beta))
        .collect();
    let present = ansatz.parameters();
    debug!(ops = ansatz.num_ops(), parameters = present.len(), "Built QAOA ansatz");

    let sample = |params: &[f64]| -> AlgorithmResult<Counts> {
        let bindings: Vec<(&str, f64)> = symbols
            .iter()
            .zip(params)
            .filter(|(name, _)| present.contains(*name))
            .map(|(name, &value)| (name.as_str(), value))
            .collect();
        let bound = ansatz.bind_parameters(&bindings)?;
        Ok(backend.run(&bound, options.shots)?.counts)
    };

    let mut failure: Option<AlgorithmError> = None;
    let optimizer = Cobyla::new().with_maxiter(options.max_iterations);
    let outcome = optimizer.minimize(
        |params| {
            if failure.is_some() {
                return f64::INFINITY;
            }
            match sample(params) {
                Ok(counts) => counts
                    .expectation(|bits| problem.objective(&parse_assignment(bits)))
                    .unwrap_or(f64::INFINITY),
                Err(e) => {
                    failure = Some(e);
                    f64::INFINITY
                }
            }
        },
        initial_parameters(options.layers, options.init),
    );
    if let Some(e) = failure {
        return Err(e);
    }
    debug!(
        expectation = outcome.optimal_value,
        evaluations = outcome.num_evaluations,
        "Optimised QAOA angles"
    );

    let counts = sample(&outcome.optimal_params)?;
    let mut best: Option<(Vec<u8>, f64)> = None;
    for (bits, _) in counts.sorted() {
        let assignment = parse_assignment(bits);
        let value = problem.objective(&assignment);
        if best.as_ref().is_none_or(|(_, v)| value < *v) {
            best = Some((assignment, value));
        }
    }
    let (bits, objective_value) = best.ok_or_else(|| {
        AlgorithmError::Backend(HalError::Backend("final sample returned no outcomes".into()))
    })?;

    let assignment: Vec<(String, u8)> = problem
        .variables()
        .iter()
        .cloned()
        .zip(bits)
        .collect();
    info!(?assignment, objective_value, "QUBO solved");

    Ok(QuboResult {
        assignment,
        objective_value,
        optimal_parameters: outcome.optimal_params,
        iterations: outcome.num_iterations,
        counts,
        elapsed_secs: start.elapsed().as_secs_f64(),
    })
}
