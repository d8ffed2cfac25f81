//! qalgo Local Statevector Simulator
//!
//! Exact statevector evolution followed by seeded shot sampling. Memory grows
//! as 2^n, so the default limit is 20 qubits.
//!
//! # Features
//!
//! - Every standard gate of `qalgo-ir`, plus matrix-defined custom gates of
//!   any width
//! - Reproducible histograms through [`SimulatorBackend::with_seed`]
//! - Direct access to final amplitudes with [`SimulatorBackend::statevector`]
//!
//! # Performance
//!
//! | Qubits | Memory | Simulation Speed |
//! |--------|--------|------------------|
//! | 10 | ~16 KB | Instant |
//! | 15 | ~512 KB | Fast |
//! | 20 | ~16 MB | Moderate |
//!
//! # Example
//!
//! ```ignore
//! use qalgo_adapter_sim::SimulatorBackend;
//! use qalgo_hal::Backend;
//! use qalgo_ir::Circuit;
//!
//! let backend = SimulatorBackend::new().with_seed(42);
//! let result = backend.run(&Circuit::bell()?, 1000)?;
//!
//! // Expect ~50% |00⟩ and ~50% |11⟩
//! println!("Results: {:?}", result.counts);
//! ```

mod simulator;
mod statevector;

pub use simulator::{DEFAULT_MAX_QUBITS, SimulatorBackend};

use qalgo_hal::BackendRegistry;

/// Name the simulator is registered under.
pub const BACKEND_NAME: &str = "statevector";

/// Add the simulator to `registry` under [`BACKEND_NAME`].
pub fn register(registry: &mut BackendRegistry) {
    registry.register::<SimulatorBackend>(BACKEND_NAME);
}
