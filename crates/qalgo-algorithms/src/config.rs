//! Configuration for the algorithm runners.
//!
//! Values are resolved in this order, later sources winning:
//! 1. Built-in defaults
//! 2. A YAML file (`--config` or `QALGO_CONFIG`)
//! 3. Environment variables with the `QALGO_` prefix
//!
//! Command-line flags are applied on top by the binary.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use qalgo_hal::BackendConfig;

use crate::qaoa::QuboOptions;
use crate::shor::ShorOptions;

/// Most qubits the statevector simulator will allocate.
pub const MAX_SIMULATOR_QUBITS: u32 = 20;

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QalgoConfig {
    /// Simulator settings.
    #[serde(default)]
    pub simulator: SimulatorConfig,

    /// Shots per routine.
    #[serde(default)]
    pub shots: ShotsConfig,

    /// Default phase-estimation demo.
    #[serde(default)]
    pub qpe: QpeConfig,

    /// QAOA settings.
    #[serde(default)]
    pub qubo: QuboConfig,
}

/// Simulator backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Registered backend name.
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Qubit capacity.
    #[serde(default = "default_max_qubits")]
    pub max_qubits: u32,

    /// Sampling seed; `None` draws from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Shots used by each routine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotsConfig {
    #[serde(default = "default_qpe_shots")]
    pub qpe: u32,

    #[serde(default = "default_shor_shots")]
    pub shor: u32,

    #[serde(default = "default_qubo_shots")]
    pub qubo: u32,
}

/// Phase-estimation demo settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QpeConfig {
    /// Counting qubits.
    #[serde(default = "default_n_count")]
    pub n_count: u32,

    /// Phase of the `P(2πθ)` demo unitary.
    #[serde(default = "default_theta")]
    pub theta: f64,
}

/// QAOA settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuboConfig {
    #[serde(default = "default_layers")]
    pub layers: usize,

    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

fn default_backend() -> String {
    "statevector".to_string()
}

fn default_max_qubits() -> u32 {
    MAX_SIMULATOR_QUBITS
}

fn default_qpe_shots() -> u32 {
    1024
}

fn default_shor_shots() -> u32 {
    2048
}

fn default_qubo_shots() -> u32 {
    1024
}

fn default_n_count() -> u32 {
    4
}

fn default_theta() -> f64 {
    0.125
}

fn default_layers() -> usize {
    1
}

fn default_max_iterations() -> usize {
    100
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            max_qubits: default_max_qubits(),
            seed: None,
        }
    }
}

impl Default for ShotsConfig {
    fn default() -> Self {
        Self {
            qpe: default_qpe_shots(),
            shor: default_shor_shots(),
            qubo: default_qubo_shots(),
        }
    }
}

impl Default for QpeConfig {
    fn default() -> Self {
        Self {
            n_count: default_n_count(),
            theta: default_theta(),
        }
    }
}

impl Default for QuboConfig {
    fn default() -> Self {
        Self {
            layers: default_layers(),
            max_iterations: default_max_iterations(),
        }
    }
}

impl QalgoConfig {
    /// Load and validate a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: QalgoConfig = serde_yaml_ng::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the configuration from an optional file and the environment.
    ///
    /// Without `path`, `QALGO_CONFIG` names the file if set.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env_path = std::env::var_os("QALGO_CONFIG").map(PathBuf::from);
        let config = match path.or(env_path.as_deref()) {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        let config = config.merge_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `QALGO_SHOTS`, `QALGO_SEED` and `QALGO_MAX_QUBITS`.
    ///
    /// Unset variables leave the current values alone; malformed ones are
    /// rejected rather than ignored.
    pub fn merge_env(mut self) -> Result<Self, ConfigError> {
        if let Some(shots) = env_number::<u32>("QALGO_SHOTS")? {
            self.set_shots(shots);
        }
        if let Some(seed) = env_number::<u64>("QALGO_SEED")? {
            self.simulator.seed = Some(seed);
        }
        if let Some(max) = env_number::<u32>("QALGO_MAX_QUBITS")? {
            self.simulator.max_qubits = max;
        }
        Ok(self)
    }

    /// Use `shots` for every routine.
    pub fn set_shots(&mut self, shots: u32) {
        self.shots = ShotsConfig {
            qpe: shots,
            shor: shots,
            qubo: shots,
        };
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limit = self.simulator.max_qubits;
        if limit == 0 || limit > MAX_SIMULATOR_QUBITS {
            return Err(ConfigError::Validation(format!(
                "simulator.max_qubits must be between 1 and {MAX_SIMULATOR_QUBITS}, got {limit}"
            )));
        }
        for (routine, shots) in [
            ("qpe", self.shots.qpe),
            ("shor", self.shots.shor),
            ("qubo", self.shots.qubo),
        ] {
            if shots == 0 {
                return Err(ConfigError::Validation(format!(
                    "shots.{routine} must be positive"
                )));
            }
        }
        if self.qpe.n_count == 0 {
            return Err(ConfigError::Validation("qpe.n_count must be positive".into()));
        }
        if !self.qpe.theta.is_finite() {
            return Err(ConfigError::Validation("qpe.theta must be finite".into()));
        }
        if self.qubo.layers == 0 {
            return Err(ConfigError::Validation("qubo.layers must be positive".into()));
        }
        Ok(())
    }

    /// Backend configuration for the registry.
    pub fn backend_config(&self) -> BackendConfig {
        let config = BackendConfig::new(&self.simulator.backend)
            .with_max_qubits(self.simulator.max_qubits);
        match self.simulator.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }

    /// Options for Shor factoring.
    pub fn shor_options(&self) -> ShorOptions {
        ShorOptions {
            shots: self.shots.shor,
            ..ShorOptions::default()
        }
    }

    /// Options for the QUBO solver.
    pub fn qubo_options(&self) -> QuboOptions {
        QuboOptions {
            layers: self.qubo.layers,
            shots: self.shots.qubo,
            max_iterations: self.qubo.max_iterations,
            ..QuboOptions::default()
        }
    }
}

fn env_number<T: std::str::FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Validation(format!("{key}={raw} is not a valid number"))),
        Err(_) => Ok(None),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] serde_yaml_ng::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}
