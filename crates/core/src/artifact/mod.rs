//! Immutable storage for generated .pkpass artifacts.

mod fs;

pub use fs::FsArtifactStore;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for artifact storage.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("No artifact for job: {0}")]
    NotFound(String),

    #[error("Artifact already exists for job: {0}")]
    AlreadyExists(String),

    #[error("Artifact storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for artifact storage backends.
///
/// Artifacts are write-once: a job produces at most one artifact and it
/// never changes afterwards. `put` for an existing job is an error.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Store the artifact for a job. Returns the stored size in bytes.
    async fn put(&self, job_id: &str, bytes: &[u8]) -> Result<u64, ArtifactError>;

    /// Fetch the artifact for a job.
    async fn get(&self, job_id: &str) -> Result<Vec<u8>, ArtifactError>;

    /// Whether an artifact exists for a job.
    async fn exists(&self, job_id: &str) -> Result<bool, ArtifactError>;
}
