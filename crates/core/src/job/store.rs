//! Job storage trait and filter types.

use std::fmt;

use crate::job::{Job, JobState};

/// Error type for job registry operations.
#[derive(Debug)]
pub enum JobError {
    /// Job not found.
    NotFound(String),
    /// Cannot perform operation due to current state.
    InvalidState {
        job_id: String,
        current_state: String,
        operation: String,
    },
    /// Database error.
    Database(String),
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobError::NotFound(id) => write!(f, "Job not found: {}", id),
            JobError::InvalidState {
                job_id,
                current_state,
                operation,
            } => write!(
                f,
                "Cannot {} job {}: current state is {}",
                operation, job_id, current_state
            ),
            JobError::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for JobError {}

/// Request to register a new job.
#[derive(Debug, Clone)]
pub struct CreateJobRequest {
    /// User the upload belongs to.
    pub user_id: String,
    /// Original upload filename.
    pub filename: String,
}

/// Filter for querying jobs.
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    /// Filter by state type.
    pub state: Option<String>,
    /// Filter by owning user.
    pub user_id: Option<String>,
    /// Maximum number of results.
    pub limit: i64,
    /// Offset for pagination.
    pub offset: i64,
}

impl JobFilter {
    /// Create a new filter with defaults.
    pub fn new() -> Self {
        Self {
            state: None,
            user_id: None,
            limit: 100,
            offset: 0,
        }
    }

    /// Filter by state type.
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Filter by owning user.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Set limit.
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    /// Set offset.
    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }
}

/// Trait for job registry backends.
///
/// Jobs are never deleted; the registry is append-and-mutate only.
pub trait JobStore: Send + Sync {
    /// Register a new job in Pending state.
    fn create(&self, request: CreateJobRequest) -> Result<Job, JobError>;

    /// Get a job by ID.
    fn get(&self, id: &str) -> Result<Option<Job>, JobError>;

    /// List jobs matching the filter, newest first.
    fn list(&self, filter: &JobFilter) -> Result<Vec<Job>, JobError>;

    /// Count jobs matching the filter.
    fn count(&self, filter: &JobFilter) -> Result<i64, JobError>;

    /// Update a job's state. Transitions out of a terminal state are
    /// rejected with `InvalidState`.
    fn update_state(&self, id: &str, new_state: JobState) -> Result<Job, JobError>;
}
