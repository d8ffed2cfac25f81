//! Simulator backend implementation.

use num_complex::Complex64;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, instrument};
use uuid::Uuid;

use qalgo_hal::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, Capabilities, Counts,
    ExecutionResult, HalError, HalResult, Job, JobId, JobStatus, ValidationResult,
};
use qalgo_ir::{Circuit, InstructionKind, QubitId};

use crate::statevector::{Statevector, sample_index};

/// Widest circuit the simulator accepts unless configured otherwise.
pub const DEFAULT_MAX_QUBITS: u32 = 20;

struct SimJob {
    job: Job,
    result: Option<ExecutionResult>,
}

/// Local statevector simulator.
///
/// The state is evolved once per job and all shots are drawn from the final
/// distribution. With a seed, a fixed sequence of jobs produces a fixed
/// sequence of histograms.
pub struct SimulatorBackend {
    name: String,
    capabilities: Capabilities,
    seed: Option<u64>,
    rng: Mutex<StdRng>,
    jobs: Mutex<FxHashMap<JobId, SimJob>>,
}

impl SimulatorBackend {
    /// Create a simulator with the default qubit limit and an entropy-seeded sampler.
    pub fn new() -> Self {
        Self {
            name: "statevector".into(),
            capabilities: Capabilities::simulator(DEFAULT_MAX_QUBITS),
            seed: None,
            rng: Mutex::new(StdRng::from_entropy()),
            jobs: Mutex::new(FxHashMap::default()),
        }
    }

    /// Limit the accepted circuit width, clamped to `1..=DEFAULT_MAX_QUBITS`.
    pub fn with_max_qubits(mut self, max_qubits: u32) -> Self {
        self.capabilities.num_qubits = max_qubits.clamp(1, DEFAULT_MAX_QUBITS);
        self
    }

    /// Make sampling reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Largest circuit width this instance accepts.
    pub fn max_qubits(&self) -> u32 {
        self.capabilities.num_qubits
    }

    /// Final amplitudes of `circuit`, ignoring its measurements.
    pub fn statevector(&self, circuit: &Circuit) -> HalResult<Vec<Complex64>> {
        Ok(self.evolve(circuit)?.into_amplitudes())
    }

    fn check_width(&self, circuit: &Circuit) -> HalResult<()> {
        let max = self.max_qubits() as usize;
        if circuit.num_qubits() > max {
            return Err(HalError::CircuitTooLarge {
                qubits: circuit.num_qubits(),
                max,
            });
        }
        Ok(())
    }

    fn evolve(&self, circuit: &Circuit) -> HalResult<Statevector> {
        self.check_width(circuit)?;
        let mut sv = Statevector::new(circuit.num_qubits());
        for inst in circuit.instructions() {
            sv.apply(inst)?;
        }
        Ok(sv)
    }

    #[instrument(skip(self, circuit), fields(circuit = circuit.name(), qubits = circuit.num_qubits()))]
    fn simulate(&self, circuit: &Circuit, shots: u32) -> HalResult<ExecutionResult> {
        let start = Instant::now();
        let readout = readout_map(circuit)?;
        let sv = self.evolve(circuit)?;
        let cumulative = sv.cumulative();
        debug!("Evolved {} amplitudes, sampling {} shots", cumulative.len(), shots);

        let mut outcomes: FxHashMap<usize, u64> = FxHashMap::default();
        {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            for _ in 0..shots {
                *outcomes.entry(sample_index(&cumulative, &mut *rng)).or_insert(0) += 1;
            }
        }

        let mut counts = Counts::new();
        for (outcome, n) in outcomes {
            counts.insert(bitstring(outcome, &readout), n);
        }

        let elapsed = start.elapsed();
        debug!("Simulation completed in {:?}", elapsed);

        let mut result = ExecutionResult::new(counts, shots)
            .with_execution_time(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
            .with_metadata("depth", circuit.depth());
        if let Some(seed) = self.seed {
            result = result.with_metadata("seed", seed);
        }
        Ok(result)
    }

    fn with_job<T>(&self, job_id: &JobId, f: impl FnOnce(&mut SimJob) -> HalResult<T>) -> HalResult<T> {
        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        let job = jobs
            .get_mut(job_id)
            .ok_or_else(|| HalError::JobNotFound(job_id.to_string()))?;
        f(job)
    }
}

impl Default for SimulatorBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Qubit read into each classical bit, `None` for bits no measurement writes.
///
/// Without measurements every qubit is read, qubit `i` into position `i`.
/// A gate acting on an already measured qubit is rejected.
fn readout_map(circuit: &Circuit) -> HalResult<Vec<Option<usize>>> {
    if !circuit.has_measurements() {
        return Ok((0..circuit.num_qubits()).map(Some).collect());
    }

    let mut readout = vec![None; circuit.num_clbits()];
    let mut measured: FxHashSet<QubitId> = FxHashSet::default();
    for inst in circuit.instructions() {
        match inst.kind {
            InstructionKind::Measure => {
                for (qubit, clbit) in inst.qubits.iter().zip(&inst.clbits) {
                    measured.insert(*qubit);
                    readout[clbit.index()] = Some(qubit.index());
                }
            }
            InstructionKind::Gate(_) => {
                if let Some(q) = inst.qubits.iter().find(|q| measured.contains(q)) {
                    return Err(HalError::Unsupported(format!(
                        "gate '{}' acts on {q} after it was measured",
                        inst.name()
                    )));
                }
            }
            InstructionKind::Barrier => {}
        }
    }
    Ok(readout)
}

/// Classical bit 0 is the leftmost character.
fn bitstring(outcome: usize, readout: &[Option<usize>]) -> String {
    readout
        .iter()
        .map(|qubit| match qubit {
            Some(q) if outcome & (1usize << *q) != 0 => '1',
            _ => '0',
        })
        .collect()
}

impl Backend for SimulatorBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        Ok(ValidationResult::check(&self.capabilities, circuit))
    }

    #[instrument(skip(self, circuit), fields(circuit = circuit.name()))]
    fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        self.check_width(circuit)?;
        let max = self.capabilities.max_shots;
        if shots == 0 || shots > max {
            return Err(HalError::InvalidShots { shots, max });
        }

        let job_id = JobId::new(Uuid::new_v4().to_string());
        let mut job = Job::new(
            job_id.clone(),
            self.name.clone(),
            circuit.name(),
            circuit.num_qubits(),
            shots,
        );
        job.advance(JobStatus::Running)?;
        debug!("Submitted job: {}", job_id);

        // A failed simulation returns its error here and its id is never
        // handed out, so only completed jobs are kept.
        let result = match self.simulate(circuit, shots) {
            Ok(result) => result,
            Err(e) => {
                debug!("Job {} failed: {}", job_id, e);
                return Err(e);
            }
        };
        job.advance(JobStatus::Completed)?;
        {
            let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
            jobs.insert(
                job_id.clone(),
                SimJob {
                    job,
                    result: Some(result),
                },
            );
        }

        Ok(job_id)
    }

    fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        self.with_job(job_id, |sim| Ok(sim.job.status.clone()))
    }

    /// Collecting a finished job forgets it; later lookups report
    /// [`HalError::JobNotFound`].
    fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        let status = jobs
            .get(job_id)
            .map(|sim| sim.job.status.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.to_string()))?;
        if !status.is_terminal() {
            return Err(HalError::Backend(format!("job {job_id} is {status}")));
        }

        let sim = jobs
            .remove(job_id)
            .ok_or_else(|| HalError::JobNotFound(job_id.to_string()))?;
        match (sim.job.status, sim.result) {
            (JobStatus::Completed, Some(result)) => Ok(result),
            (JobStatus::Failed(msg), _) => Err(HalError::JobFailed(msg)),
            (JobStatus::Cancelled, _) => Err(HalError::JobCancelled),
            (status, _) => Err(HalError::Backend(format!("job {job_id} is {status}"))),
        }
    }

    /// Jobs finish inside `submit`, so cancelling a known job is a no-op.
    fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        self.with_job(job_id, |sim| {
            if sim.job.status.is_terminal() {
                Ok(())
            } else {
                sim.job.advance(JobStatus::Cancelled)
            }
        })
    }
}

impl BackendFactory for SimulatorBackend {
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        let mut backend = Self::new();
        if let Some(max_qubits) = config.max_qubits {
            if max_qubits == 0 || max_qubits > DEFAULT_MAX_QUBITS {
                return Err(HalError::Configuration(format!(
                    "max_qubits must be between 1 and {DEFAULT_MAX_QUBITS}, got {max_qubits}"
                )));
            }
            backend = backend.with_max_qubits(max_qubits);
        }
        if let Some(seed) = config.seed {
            backend = backend.with_seed(seed);
        }
        backend.name = config.name;
        Ok(backend)
    }
}
