//! `--qubo`: solve the demonstration QUBO with QAOA.

use anyhow::{Context, Result};
use console::style;

use qalgo_algorithms::{QalgoConfig, simple_qubo_problem, solve_qubo};
use qalgo_hal::Backend;

use super::common::{heading, print_counts, section, spinner};

/// Solve `minimize x0 + x1 - 2 x0 x1` and print the assignment.
pub fn execute(backend: &dyn Backend, config: &QalgoConfig) -> Result<()> {
    section("Solving QUBO Optimization Problem");

    let problem = simple_qubo_problem();
    println!("  {problem}");

    let progress = spinner(format!(
        "Optimising QAOA angles (p = {})...",
        config.qubo.layers
    ));
    let outcome = solve_qubo(&problem, backend, &config.qubo_options());
    progress.finish_and_clear();
    let result = outcome.with_context(|| format!("Failed to solve '{}'", problem.name()))?;

    heading("QUBO Optimization Result");
    let assignment: Vec<String> = result
        .assignment
        .iter()
        .map(|(name, bit)| format!("{name}: {bit}"))
        .collect();
    println!(
        "Optimal Assignment   : {}",
        style(format!("{{{}}}", assignment.join(", "))).green().bold()
    );
    println!("Objective Value      : {}", result.objective_value);
    println!("Optimizer Iterations : {}", result.iterations);

    println!("\nFinal sample:");
    print_counts(&result.counts, 8);
    Ok(())
}
