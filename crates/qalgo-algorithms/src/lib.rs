//! qalgo algorithm routines
//!
//! Circuit builders and drivers for four textbook quantum algorithms, all
//! running against any [`qalgo_hal::Backend`]:
//!
//! - [`qft`]: the Quantum Fourier Transform as an in-place builder and a
//!   standalone circuit
//! - [`qpe`]: phase estimation for a controlled unitary and its eigenstate
//! - [`shor`]: integer factoring through quantum order finding
//! - [`qaoa`] and [`qubo`]: QAOA minimisation of binary quadratic problems
//!
//! # Example: Estimating a Phase
//!
//! ```ignore
//! use qalgo_adapter_sim::SimulatorBackend;
//! use qalgo_algorithms::qpe::{phase_unitary, qpe_circuit, simulate_qpe};
//! use qalgo_ir::{Circuit, QubitId};
//!
//! let mut eigenstate = Circuit::with_size("one", 1, 0);
//! eigenstate.x(QubitId(0))?;
//!
//! let circuit = qpe_circuit(&phase_unitary(0.125), &eigenstate, 4)?;
//! let backend = SimulatorBackend::new().with_seed(1);
//! let (_, report) = simulate_qpe(&circuit, &backend, 1024)?;
//! assert_eq!(report.most_likely().unwrap().phase, 0.125);
//! ```
//!
//! # Example: Factoring
//!
//! ```ignore
//! use qalgo_adapter_sim::SimulatorBackend;
//! use qalgo_algorithms::shor::{ShorOptions, factor_integer};
//!
//! let backend = SimulatorBackend::new().with_seed(7);
//! let report = factor_integer(15, &backend, &ShorOptions::default())?;
//! assert_eq!(report.factors, vec![3, 5]);
//! ```

pub mod config;
pub mod error;
pub mod optimizer;
pub mod qaoa;
pub mod qft;
pub mod qpe;
pub mod qubo;
pub mod shor;

pub use config::{ConfigError, QalgoConfig};
pub use error::{AlgorithmError, AlgorithmResult};
pub use optimizer::{Cobyla, OptimizationResult, Optimizer};
pub use qaoa::{QuboOptions, QuboResult, qaoa_ansatz, solve_qubo};
pub use qft::{apply_qft, create_qft_circuit};
pub use qpe::{PhaseEntry, PhaseReport, estimate_phase, phase_unitary, qpe_circuit, simulate_qpe};
pub use qubo::{IsingModel, QuadraticProgram, simple_qubo_problem};
pub use shor::{FactorMethod, ShorOptions, ShorReport, factor_integer};
