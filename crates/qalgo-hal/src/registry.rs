//! Backend registry.
//!
//! The [`BackendRegistry`] maps backend names, as they appear in
//! configuration files, to constructors.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::backend::{Backend, BackendConfig, BackendFactory};
use crate::error::{HalError, HalResult};

type Factory = Box<dyn Fn(BackendConfig) -> HalResult<Box<dyn Backend>> + Send + Sync>;

/// Named backend constructors.
pub struct BackendRegistry {
    factories: FxHashMap<String, Factory>,
}

impl BackendRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            factories: FxHashMap::default(),
        }
    }

    /// Register a backend type under `name`.
    pub fn register<B>(&mut self, name: impl Into<String>)
    where
        B: BackendFactory + 'static,
    {
        let name = name.into();
        debug!("Registering backend: {}", name);
        self.factories.insert(
            name,
            Box::new(|config| Ok(Box::new(B::from_config(config)?) as Box<dyn Backend>)),
        );
    }

    /// Register a backend with a custom constructor.
    pub fn register_factory(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn(BackendConfig) -> HalResult<Box<dyn Backend>> + Send + Sync + 'static,
    ) {
        let name = name.into();
        debug!("Registering factory backend: {}", name);
        self.factories.insert(name, Box::new(factory));
    }

    /// Create the backend named by `config.name`.
    pub fn create(&self, config: BackendConfig) -> HalResult<Box<dyn Backend>> {
        match self.factories.get(&config.name) {
            Some(factory) => factory(config),
            None => Err(HalError::UnknownBackend {
                name: config.name,
                available: self.available_backends().join(", "),
            }),
        }
    }

    /// All registered backend names, sorted.
    pub fn available_backends(&self) -> Vec<String> {
        let mut names: Vec<_> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a backend is registered under `name`.
    pub fn has_backend(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendAvailability, ValidationResult};
    use crate::capability::Capabilities;
    use crate::job::{JobId, JobStatus};
    use crate::result::{Counts, ExecutionResult};
    use qalgo_ir::Circuit;

    /// Backend that answers every circuit with all-zero outcomes.
    struct ZeroBackend {
        caps: Capabilities,
    }

    impl Backend for ZeroBackend {
        fn name(&self) -> &str {
            "zero"
        }

        fn capabilities(&self) -> &Capabilities {
            &self.caps
        }

        fn availability(&self) -> HalResult<BackendAvailability> {
            Ok(BackendAvailability::always_available())
        }

        fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
            Ok(ValidationResult::check(&self.caps, circuit))
        }

        fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
            Ok(JobId::new(format!("{}:{}:{shots}", circuit.name(), circuit.num_clbits())))
        }

        fn status(&self, _job_id: &JobId) -> HalResult<JobStatus> {
            Ok(JobStatus::Completed)
        }

        fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
            let mut parts = job_id.as_str().rsplit(':');
            let shots: u32 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);
            let width: usize = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);
            let counts = Counts::from_pairs([("0".repeat(width), u64::from(shots))]);
            Ok(ExecutionResult::new(counts, shots))
        }

        fn cancel(&self, _job_id: &JobId) -> HalResult<()> {
            Ok(())
        }
    }

    impl BackendFactory for ZeroBackend {
        fn from_config(config: BackendConfig) -> HalResult<Self> {
            let width = config.max_qubits.unwrap_or(4);
            Ok(Self {
                caps: Capabilities::simulator(width),
            })
        }
    }

    #[test]
    fn test_empty_registry() {
        let registry = BackendRegistry::new();
        assert!(registry.available_backends().is_empty());
        assert!(!registry.has_backend("statevector"));
    }

    #[test]
    fn test_create_unknown_backend_lists_known() {
        let mut registry = BackendRegistry::new();
        registry.register::<ZeroBackend>("zero");
        let Err(err) = registry.create(BackendConfig::new("qpu")) else {
            panic!("Expected unknown backend error");
        };
        assert!(err.to_string().contains("zero"));
    }

    #[test]
    fn test_available_backends_sorted() {
        let mut registry = BackendRegistry::new();
        registry.register_factory("zebra", |_| Err(HalError::BackendUnavailable("test".into())));
        registry.register_factory("alpha", |_| Err(HalError::BackendUnavailable("test".into())));
        assert_eq!(registry.available_backends(), vec!["alpha", "zebra"]);
    }

    #[test]
    fn test_registered_backend_runs_circuit() {
        let mut registry = BackendRegistry::new();
        registry.register::<ZeroBackend>("zero");
        let backend = registry.create(BackendConfig::new("zero")).unwrap();

        let result = backend.run(&Circuit::bell().unwrap(), 64).unwrap();
        assert_eq!(result.counts.get("00"), 64);
        assert_eq!(result.shots, 64);
    }

    #[test]
    fn test_run_rejects_opaque_gate() {
        let mut registry = BackendRegistry::new();
        registry.register::<ZeroBackend>("zero");
        let backend = registry.create(BackendConfig::new("zero")).unwrap();

        let mut circuit = Circuit::with_size("opaque", 1, 0);
        circuit
            .gate(qalgo_ir::CustomGate::new("oracle", 1), [qalgo_ir::QubitId(0)])
            .unwrap();
        assert!(matches!(
            backend.run(&circuit, 10),
            Err(HalError::InvalidCircuit(_))
        ));
    }

    #[test]
    fn test_run_rejects_wide_circuit() {
        let mut registry = BackendRegistry::new();
        registry.register::<ZeroBackend>("zero");
        let backend = registry
            .create(BackendConfig::new("zero").with_max_qubits(2))
            .unwrap();

        let circuit = Circuit::ghz(3).unwrap();
        assert!(matches!(
            backend.run(&circuit, 10),
            Err(HalError::CircuitTooLarge { qubits: 3, max: 2 })
        ));
    }
}
