//! qalgo Hardware Abstraction Layer
//!
//! A small, synchronous interface between the qalgo routines and whatever
//! executes their circuits.
//!
//! Routines only see [`Backend`]. They pick one by name from a
//! [`BackendRegistry`], check it against its [`Capabilities`], and read
//! measurement histograms ([`Counts`]) out of an [`ExecutionResult`].
//!
//! # Example: Running a Circuit
//!
//! ```ignore
//! use qalgo_hal::Backend;
//! use qalgo_adapter_sim::SimulatorBackend;
//! use qalgo_ir::Circuit;
//!
//! let circuit = Circuit::bell()?;
//! let backend = SimulatorBackend::new().with_seed(7);
//!
//! let result = backend.run(&circuit, 1000)?;
//! if let Some((bitstring, count)) = result.counts.most_frequent() {
//!     println!("Most frequent: {bitstring} ({count} times)");
//! }
//! ```
//!
//! # Implementing a Custom Backend
//!
//! ```ignore
//! use qalgo_hal::{
//!     Backend, BackendAvailability, Capabilities, ExecutionResult, HalResult, JobId,
//!     JobStatus, ValidationResult,
//! };
//! use qalgo_ir::Circuit;
//!
//! struct MyBackend {
//!     capabilities: Capabilities,
//! }
//!
//! impl Backend for MyBackend {
//!     fn name(&self) -> &str { "my_backend" }
//!
//!     fn capabilities(&self) -> &Capabilities {
//!         &self.capabilities
//!     }
//!
//!     fn availability(&self) -> HalResult<BackendAvailability> {
//!         Ok(BackendAvailability::always_available())
//!     }
//!
//!     fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
//!         Ok(ValidationResult::check(&self.capabilities, circuit))
//!     }
//!
//!     fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
//!         # todo!()
//!     }
//!
//!     fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
//!         # todo!()
//!     }
//!
//!     fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
//!         # todo!()
//!     }
//!
//!     fn cancel(&self, job_id: &JobId) -> HalResult<()> {
//!         # todo!()
//!     }
//! }
//! ```

pub mod backend;
pub mod capability;
pub mod error;
pub mod job;
pub mod registry;
pub mod result;

pub use backend::{Backend, BackendAvailability, BackendConfig, BackendFactory, ValidationResult};
pub use capability::{Capabilities, GateSet};
pub use error::{HalError, HalResult};
pub use job::{Job, JobId, JobStatus};
pub use registry::BackendRegistry;
pub use result::{Counts, ExecutionResult};
