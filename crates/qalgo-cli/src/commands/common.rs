//! Shared console helpers for the routine runners.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use qalgo_hal::Counts;

/// Print the banner that opens a routine's output.
pub fn section(title: &str) {
    println!("\n{} {}", style("---").dim(), style(title).cyan().bold());
}

/// Print a report heading with its underline.
pub fn heading(title: &str) {
    println!("{}", style(title).bold());
    println!("{}", "-".repeat(title.chars().count()));
}

/// A steady-ticking spinner on stderr; hidden when stderr is not a terminal.
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let template = ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(template);
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Print a histogram, most frequent outcome first, `limit` rows at most.
pub fn print_counts(counts: &Counts, limit: usize) {
    let sorted = counts.sorted();
    let total = counts.total_shots().max(1) as f64;

    for (bitstring, count) in sorted.iter().take(limit) {
        let prob = *count as f64 / total * 100.0;
        let bar: String = "█".repeat((prob / 2.0).round() as usize);
        println!(
            "  {}: {:>6} ({:>5.2}%) {}",
            style(bitstring).cyan(),
            count,
            prob,
            style(bar).green()
        );
    }

    if sorted.len() > limit {
        println!("  ... and {} more outcomes", sorted.len() - limit);
    }
}
