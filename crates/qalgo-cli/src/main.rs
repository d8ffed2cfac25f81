//! qalgo Command-Line Interface
//!
//! Runs the textbook algorithm demos on the built-in statevector simulator:
//!
//! ```text
//! qalgo                      # every routine with its defaults
//! qalgo --shor 15 --seed 7   # factor 15 reproducibly
//! qalgo --qft 4              # draw a 4-qubit QFT
//! qalgo --qpe --qubo -vv     # phase estimation and QUBO, debug logging
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use tracing::info;
use tracing_subscriber::EnvFilter;

use qalgo_algorithms::QalgoConfig;
use qalgo_hal::BackendRegistry;

mod commands;

use commands::{qft, qpe, qubo, shor};

const DEFAULT_SHOR_N: u64 = 21;
const DEFAULT_QFT_QUBITS: u32 = 3;

/// qalgo - Shor, QFT, phase estimation and QUBO on a statevector simulator
#[derive(Parser)]
#[command(name = "qalgo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Factor N with Shor's algorithm
    #[arg(long, value_name = "N")]
    shor: Option<u64>,

    /// Draw an N-qubit Quantum Fourier Transform circuit
    #[arg(long, value_name = "N")]
    qft: Option<u32>,

    /// Run quantum phase estimation
    #[arg(long)]
    qpe: bool,

    /// Solve the demonstration QUBO problem with QAOA
    #[arg(long)]
    qubo: bool,

    /// Run every routine (the default when no routine is selected)
    #[arg(long)]
    all: bool,

    /// Shots for every sampled routine
    #[arg(long)]
    shots: Option<u32>,

    /// Seed for reproducible sampling
    #[arg(long)]
    seed: Option<u64>,

    /// YAML configuration file
    #[arg(long, env = "QALGO_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// One routine selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Routine {
    Shor(u64),
    Qft(u32),
    Qpe,
    Qubo,
}

impl Cli {
    /// Selected routines in execution order.
    fn routines(&self) -> Vec<Routine> {
        let none_selected = self.shor.is_none() && self.qft.is_none() && !self.qpe && !self.qubo;
        let every = self.all || none_selected;

        let mut routines = Vec::with_capacity(4);
        if let Some(n) = self.shor.or(every.then_some(DEFAULT_SHOR_N)) {
            routines.push(Routine::Shor(n));
        }
        if let Some(n) = self.qft.or(every.then_some(DEFAULT_QFT_QUBITS)) {
            routines.push(Routine::Qft(n));
        }
        if self.qpe || every {
            routines.push(Routine::Qpe);
        }
        if self.qubo || every {
            routines.push(Routine::Qubo);
        }
        routines
    }

    /// Configuration with command-line overrides applied.
    fn config(&self) -> Result<QalgoConfig> {
        let mut config =
            QalgoConfig::load(self.config.as_deref()).context("Failed to load configuration")?;
        if let Some(shots) = self.shots {
            config.set_shots(shots);
        }
        if let Some(seed) = self.seed {
            config.simulator.seed = Some(seed);
        }
        config.validate().context("Invalid command-line options")?;
        Ok(config)
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.config()?;

    let mut registry = BackendRegistry::new();
    qalgo_adapter_sim::register(&mut registry);
    let backend = registry
        .create(config.backend_config())
        .context("Failed to create simulator backend")?;
    info!(
        backend = backend.name(),
        qubits = backend.capabilities().num_qubits,
        seed = ?config.simulator.seed,
        "Backend ready"
    );

    for routine in cli.routines() {
        match routine {
            Routine::Shor(n) => shor::execute(n, backend.as_ref(), &config)?,
            Routine::Qft(n) => qft::execute(n)?,
            Routine::Qpe => qpe::execute(backend.as_ref(), &config)?,
            Routine::Qubo => qubo::execute(backend.as_ref(), &config)?,
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard, PoisonError};

    /// Serializes tests that resolve configuration from the environment.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("qalgo").chain(args.iter().copied())).unwrap()
    }

    fn env_guard() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[test]
    fn test_no_flags_runs_everything_with_defaults() {
        assert_eq!(
            parse(&[]).routines(),
            vec![
                Routine::Shor(21),
                Routine::Qft(3),
                Routine::Qpe,
                Routine::Qubo
            ]
        );
    }

    #[test]
    fn test_single_routine() {
        assert_eq!(parse(&["--shor", "15"]).routines(), vec![Routine::Shor(15)]);
        assert_eq!(parse(&["--qubo"]).routines(), vec![Routine::Qubo]);
    }

    #[test]
    fn test_all_keeps_explicit_values() {
        let routines = parse(&["--all", "--qft", "5"]).routines();
        assert_eq!(routines[0], Routine::Shor(21));
        assert_eq!(routines[1], Routine::Qft(5));
        assert_eq!(routines.len(), 4);
    }

    #[test]
    fn test_order_is_fixed() {
        let routines = parse(&["--qubo", "--qpe", "--qft", "2"]).routines();
        assert_eq!(routines, vec![Routine::Qft(2), Routine::Qpe, Routine::Qubo]);
    }

    #[test]
    fn test_command_line_overrides() {
        let _guard = env_guard();
        let cli = parse(&["--shots", "64", "--seed", "5"]);
        let config = cli.config().unwrap();
        assert_eq!(config.shots.shor, 64);
        assert_eq!(config.simulator.seed, Some(5));
    }

    #[test]
    fn test_zero_shots_rejected() {
        let _guard = env_guard();
        let cli = parse(&["--shots", "0"]);
        assert!(cli.config().is_err());
    }

    #[test]
    fn test_shots_flag_beats_environment() {
        let _guard = env_guard();
        // SAFETY: every test resolving configuration holds ENV_LOCK.
        unsafe {
            std::env::set_var("QALGO_SHOTS", "500");
            std::env::set_var("QALGO_SEED", "8");
        }
        let flagged = parse(&["--shots", "64"]).config();
        let unflagged = parse(&[]).config();
        unsafe {
            std::env::remove_var("QALGO_SHOTS");
            std::env::remove_var("QALGO_SEED");
        }

        let flagged = flagged.unwrap();
        assert_eq!(flagged.shots.shor, 64);
        assert_eq!(flagged.shots.qpe, 64);
        assert_eq!(flagged.simulator.seed, Some(8));
        assert_eq!(unflagged.unwrap().shots.qubo, 500);
    }

    #[test]
    fn test_verbosity_and_bad_values() {
        assert_eq!(parse(&["-vvv"]).verbose, 3);
        assert!(Cli::try_parse_from(["qalgo", "--shor", "abc"]).is_err());
        assert!(Cli::try_parse_from(["qalgo", "--shor"]).is_err());
        assert!(Cli::try_parse_from(["qalgo", "compile"]).is_err());
    }
}
