//! Core job data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A pass-generation job, tracking one upload's processing lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    /// Opaque identifier (UUID v4).
    pub id: String,
    /// User that owns the upload.
    pub user_id: String,
    /// Original upload filename, used for the pass title fallback and
    /// the download filename.
    pub filename: String,
    /// Current lifecycle state.
    pub state: JobState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lifecycle state of a job.
///
/// Pending -> Processing -> Ready | Failed. Only the pipeline moves a job
/// out of Pending; terminal states are never left.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobState {
    /// Created on upload acceptance, waiting for a pipeline slot.
    Pending,

    /// The pipeline is generating the pass.
    Processing { started_at: DateTime<Utc> },

    /// The signed artifact has been written and can be downloaded.
    Ready {
        completed_at: DateTime<Utc>,
        /// Size of the .pkpass artifact in bytes.
        artifact_size_bytes: u64,
        /// Whether the pass carries a PKCS#7 signature.
        signed: bool,
    },

    /// Generation failed (terminal).
    Failed {
        error: String,
        failed_at: DateTime<Utc>,
    },
}

impl JobState {
    /// Returns true if the job has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Ready { .. } | JobState::Failed { .. })
    }

    /// Returns the state type as a string (used for filtering and metrics).
    pub fn state_type(&self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Processing { .. } => "processing",
            JobState::Ready { .. } => "ready",
            JobState::Failed { .. } => "failed",
        }
    }

    /// Coarse progress percentage surfaced by the status endpoint.
    pub fn progress(&self) -> u8 {
        match self {
            JobState::Pending => 0,
            JobState::Processing { .. } => 50,
            JobState::Ready { .. } | JobState::Failed { .. } => 100,
        }
    }

    /// Failure reason for Failed jobs.
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            JobState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}
