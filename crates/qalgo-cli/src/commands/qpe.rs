//! `--qpe`: phase estimation of `P(2πθ)` on `|1⟩`.

use anyhow::{Context, Result};
use console::style;

use qalgo_algorithms::{QalgoConfig, phase_unitary, qpe_circuit, simulate_qpe};
use qalgo_hal::Backend;
use qalgo_ir::{Circuit, QubitId};

use super::common::{heading, section, spinner};

/// Estimate the configured phase and print every observed outcome.
pub fn execute(backend: &dyn Backend, config: &QalgoConfig) -> Result<()> {
    section("Executing Quantum Phase Estimation");

    let mut eigenstate = Circuit::with_size("eigenstate", 1, 0);
    eigenstate.x(QubitId(0))?;
    let circuit = qpe_circuit(&phase_unitary(config.qpe.theta), &eigenstate, config.qpe.n_count)
        .context("Failed to build the phase estimation circuit")?;
    println!(
        "  Circuit: {} qubits, depth {}, θ = {}",
        circuit.num_qubits(),
        circuit.depth(),
        config.qpe.theta
    );

    let progress = spinner(format!("Sampling {} shots...", config.shots.qpe));
    let outcome = simulate_qpe(&circuit, backend, config.shots.qpe);
    progress.finish_and_clear();
    let (_, report) = outcome.context("Phase estimation run failed")?;

    heading("Quantum Phase Estimation Result Summary");
    for entry in &report.entries {
        println!(
            "Observed: {} | Phase: {:.6} | Frequency: {}",
            style(&entry.outcome).cyan(),
            entry.phase,
            entry.count
        );
    }
    Ok(())
}
