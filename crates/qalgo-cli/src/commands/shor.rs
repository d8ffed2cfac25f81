//! `--shor N`: factor an integer.

use anyhow::{Context, Result};
use console::style;

use qalgo_algorithms::{QalgoConfig, factor_integer};
use qalgo_hal::Backend;

use super::common::{heading, section, spinner};

/// Factor `n` and print the execution report.
pub fn execute(n: u64, backend: &dyn Backend, config: &QalgoConfig) -> Result<()> {
    section("Executing Shor's Algorithm");

    let progress = spinner(format!("Factoring {n} on {}...", backend.name()));
    let outcome = factor_integer(n, backend, &config.shor_options());
    progress.finish_and_clear();
    let report = outcome.with_context(|| format!("Failed to factor {n}"))?;

    heading("Shor's Algorithm Execution Report");
    println!("Input Integer        : {}", report.n);
    println!("Execution Time       : {:.4} seconds", report.elapsed_secs);
    if report.factors.is_empty() {
        println!(
            "{}",
            style("No non-trivial factors found. Shor's algorithm did not succeed for this input.")
                .yellow()
        );
    } else {
        let factors: Vec<String> = report.factors.iter().map(u64::to_string).collect();
        println!("Non-trivial Factors  : {}", style(factors.join(", ")).green().bold());
    }
    if let (Some(base), Some(order)) = (report.base, report.order) {
        println!("Base / Order         : {base} / {order}");
    }
    Ok(())
}
