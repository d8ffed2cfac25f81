//! `--qft N`: draw a Fourier transform circuit.

use anyhow::{Result, ensure};

use qalgo_algorithms::create_qft_circuit;

use super::common::section;

/// Upper bound for drawing; wider circuits do not fit a terminal.
const MAX_DRAWN_QUBITS: u32 = 32;

/// Build and print an `n`-qubit QFT.
pub fn execute(n: u32) -> Result<()> {
    section("Generating QFT Circuit");
    ensure!(
        (1..=MAX_DRAWN_QUBITS).contains(&n),
        "QFT size must be between 1 and {MAX_DRAWN_QUBITS}, got {n}"
    );
    let circuit = create_qft_circuit(n);
    print!("{circuit}");
    Ok(())
}
