//! Backend trait and configuration.
//!
//! The [`Backend`] trait defines the lifecycle of one circuit execution:
//!
//! ```text
//!   capabilities() ──→ validate() ──→ submit() ──→ status() ──→ result()
//! ```
//!
//! Every method is synchronous. A local backend finishes the job inside
//! `submit()`; [`Backend::run`] chains the whole lifecycle for callers that
//! only want counts.
//!
//! ## Method table
//!
//! | Method | Required | Returns |
//! |--------|----------|---------|
//! | `name()` | yes | `&str` |
//! | `capabilities()` | yes | `&Capabilities` |
//! | `availability()` | yes | `HalResult<BackendAvailability>` |
//! | `validate()` | yes | `HalResult<ValidationResult>` |
//! | `submit()` | yes | `HalResult<JobId>` |
//! | `status()` | yes | `HalResult<JobStatus>` |
//! | `result()` | yes | `HalResult<ExecutionResult>` |
//! | `cancel()` | yes | `HalResult<()>` |
//! | `run()` | provided | `HalResult<ExecutionResult>` |

use serde::{Deserialize, Serialize};
use tracing::debug;

use qalgo_ir::{Circuit, GateKind, InstructionKind};

use crate::capability::Capabilities;
use crate::error::{HalError, HalResult};
use crate::job::{JobId, JobStatus};
use crate::result::ExecutionResult;

/// Settings used to construct a backend through the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Registry key.
    pub name: String,
    /// Seed for sampling. `None` draws from system entropy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Upper bound on circuit width, below the backend's own limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_qubits: Option<u32>,
    /// Settings only one backend understands.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl BackendConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            seed: None,
            max_qubits: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Set the sampling seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the qubit limit.
    pub fn with_max_qubits(mut self, max_qubits: u32) -> Self {
        self.max_qubits = Some(max_qubits);
        self
    }

    /// Insert a backend-specific setting.
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Something that samples measurement outcomes of a circuit.
///
/// - `capabilities()` is infallible and cached at construction time.
/// - `validate()` checks the circuit against those capabilities.
/// - `result()` only succeeds once `status()` reports `Completed`.
pub trait Backend: Send + Sync {
    fn name(&self) -> &str;

    fn capabilities(&self) -> &Capabilities;

    /// Whether new jobs would be accepted right now.
    fn availability(&self) -> HalResult<BackendAvailability>;

    /// Check a circuit against [`Backend::capabilities`] without running it.
    fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult>;

    /// Submit a circuit for `shots` executions.
    fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId>;

    fn status(&self, job_id: &JobId) -> HalResult<JobStatus>;

    /// Counts of a job. Fails unless its status is
    /// [`JobStatus::Completed`].
    fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult>;

    /// Cancel a job that has not finished.
    fn cancel(&self, job_id: &JobId) -> HalResult<()>;

    /// Validate, submit and collect the result of one circuit.
    ///
    /// A circuit wider than the backend fails with [`HalError::CircuitTooLarge`]
    /// before validation.
    fn run(&self, circuit: &Circuit, shots: u32) -> HalResult<ExecutionResult> {
        let max = self.capabilities().num_qubits as usize;
        if circuit.num_qubits() > max {
            return Err(HalError::CircuitTooLarge {
                qubits: circuit.num_qubits(),
                max,
            });
        }
        if let ValidationResult::Invalid { reasons } = self.validate(circuit)? {
            return Err(HalError::InvalidCircuit(reasons.join("; ")));
        }
        let job_id = self.submit(circuit, shots)?;
        debug!(backend = self.name(), job = %job_id, "Submitted circuit");

        match self.status(&job_id)? {
            JobStatus::Completed => self.result(&job_id),
            JobStatus::Failed(msg) => Err(HalError::JobFailed(msg)),
            JobStatus::Cancelled => Err(HalError::JobCancelled),
            JobStatus::Queued | JobStatus::Running => Err(HalError::Backend(format!(
                "job {job_id} did not finish on a synchronous backend"
            ))),
        }
    }
}

/// Backend availability information.
#[derive(Debug, Clone)]
pub struct BackendAvailability {
    /// Whether the backend is currently accepting jobs.
    pub is_available: bool,
    /// Human-readable status message.
    pub status_message: Option<String>,
}

impl BackendAvailability {
    /// Availability of a local simulator.
    pub fn always_available() -> Self {
        Self {
            is_available: true,
            status_message: None,
        }
    }

    /// Create availability for an offline backend.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            is_available: false,
            status_message: Some(reason.into()),
        }
    }
}

/// Result of circuit validation against backend constraints.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    /// Circuit can be submitted as-is.
    Valid,
    /// Circuit cannot run on this backend.
    Invalid {
        /// Reasons the circuit is invalid.
        reasons: Vec<String>,
    },
}

impl ValidationResult {
    /// Check if the circuit is valid.
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    /// Check width and gate support of `circuit` against `caps`.
    pub fn check(caps: &Capabilities, circuit: &Circuit) -> Self {
        let mut reasons = Vec::new();
        if circuit.num_qubits() > caps.num_qubits as usize {
            reasons.push(format!(
                "circuit has {} qubits, backend supports {}",
                circuit.num_qubits(),
                caps.num_qubits
            ));
        }
        for inst in circuit.instructions() {
            let InstructionKind::Gate(gate) = &inst.kind else {
                continue;
            };
            let reason = match &gate.kind {
                GateKind::Standard(g) if !caps.supports_gate(g.name()) => {
                    Some(format!("unsupported gate '{}'", g.name()))
                }
                GateKind::Custom(c) if !caps.custom_gates => {
                    Some(format!("custom gate '{}' not supported", c.name))
                }
                GateKind::Custom(c) if c.matrix.is_none() => {
                    Some(format!("custom gate '{}' has no matrix", c.name))
                }
                _ => None,
            };
            if let Some(reason) = reason {
                if !reasons.contains(&reason) {
                    reasons.push(reason);
                }
            }
        }
        if reasons.is_empty() {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid { reasons }
        }
    }
}

/// Trait for creating backends from configuration.
pub trait BackendFactory: Backend + Sized {
    /// Create a backend from configuration.
    fn from_config(config: BackendConfig) -> HalResult<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use qalgo_ir::{CustomGate, QubitId};

    #[test]
    fn test_backend_config() {
        let config = BackendConfig::new("statevector")
            .with_seed(7)
            .with_max_qubits(12)
            .with_extra("note", serde_json::json!("local"));

        assert_eq!(config.name, "statevector");
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.max_qubits, Some(12));
        assert!(config.extra.contains_key("note"));
    }

    #[test]
    fn test_backend_config_flattens_extra() {
        let config: BackendConfig =
            serde_json::from_str(r#"{"name": "sv", "seed": 3, "precision": "double"}"#).unwrap();
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.extra["precision"], "double");
    }

    #[test]
    fn test_backend_availability() {
        assert!(BackendAvailability::always_available().is_available);
        let avail = BackendAvailability::unavailable("maintenance");
        assert!(!avail.is_available);
        assert_eq!(avail.status_message, Some("maintenance".to_string()));
    }

    #[test]
    fn test_check_accepts_bell() {
        let caps = Capabilities::simulator(4);
        let circuit = Circuit::bell().unwrap();
        assert!(ValidationResult::check(&caps, &circuit).is_valid());
    }

    #[test]
    fn test_check_reports_width_and_opaque_gate() {
        let caps = Capabilities::simulator(2);
        let mut circuit = Circuit::with_size("wide", 3, 0);
        circuit
            .gate(CustomGate::new("oracle", 1), [QubitId(0)])
            .unwrap();

        let ValidationResult::Invalid { reasons } = ValidationResult::check(&caps, &circuit) else {
            panic!("Expected invalid circuit");
        };
        assert_eq!(reasons.len(), 2);
        assert!(reasons[1].contains("oracle"));
    }
}
