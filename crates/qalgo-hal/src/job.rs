//! Job records for synchronous backends.
//!
//! A local backend runs a circuit inside `submit()`, so a job is usually
//! terminal by the time its id is returned:
//!
//! ```text
//!   submit() ──→ Running ──→ Completed
//!                   │
//!                   └──────→ Failed(reason)
//! ```
//!
//! Terminal states (`Completed`, `Failed`, `Cancelled`) never change again.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HalError, HalResult};

/// Backend-assigned job handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(pub String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Accepted but not started.
    Queued,
    /// Executing.
    Running,
    /// Finished with a result.
    Completed,
    /// Finished without a result.
    Failed(String),
    /// Stopped on request.
    Cancelled,
}

impl JobStatus {
    /// `Completed`, `Failed` or `Cancelled`.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed(_) | JobStatus::Cancelled
        )
    }

    pub fn is_success(&self) -> bool {
        matches!(self, JobStatus::Completed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "Queued"),
            JobStatus::Running => write!(f, "Running"),
            JobStatus::Completed => write!(f, "Completed"),
            JobStatus::Failed(msg) => write!(f, "Failed: {msg}"),
            JobStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// Bookkeeping for one circuit execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    /// Name of the executed circuit.
    pub circuit: String,
    /// Width of the executed circuit.
    pub num_qubits: usize,
    pub shots: u32,
    pub status: JobStatus,
    pub backend: String,
    pub created_at: DateTime<Utc>,
    /// Set on entering a terminal state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn new(
        id: JobId,
        backend: impl Into<String>,
        circuit: impl Into<String>,
        num_qubits: usize,
        shots: u32,
    ) -> Self {
        Self {
            id,
            circuit: circuit.into(),
            num_qubits,
            shots,
            status: JobStatus::Queued,
            backend: backend.into(),
            created_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Move the job to `status`.
    ///
    /// Fails when the job is already terminal.
    pub fn advance(&mut self, status: JobStatus) -> HalResult<()> {
        if self.status.is_terminal() {
            return Err(HalError::Backend(format!(
                "job {} is already {}",
                self.id, self.status
            )));
        }
        if status.is_terminal() {
            self.finished_at = Some(Utc::now());
        }
        self.status = status;
        Ok(())
    }

    /// Wall-clock time between creation and completion, in milliseconds.
    pub fn elapsed_ms(&self) -> Option<u64> {
        let finished = self.finished_at?;
        u64::try_from((finished - self.created_at).num_milliseconds()).ok()
    }
}
