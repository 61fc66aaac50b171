//! Pipeline error and status types.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::artifact::ArtifactError;
use crate::job::JobError;
use crate::pdf::PdfError;
use crate::signer::SignerError;

/// Error type for pipeline operations.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The uploaded document failed structural validation.
    #[error("PDF validation failed: {0}")]
    Pdf(#[from] PdfError),

    /// Job registry error.
    #[error("Job registry error: {0}")]
    Job(#[from] JobError),

    /// The job disappeared between submission and processing.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// pass.json could not be serialized.
    #[error("Failed to serialize pass: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Packaging or signing failed.
    #[error("Packaging failed: {0}")]
    Signer(#[from] SignerError),

    /// Artifact storage failed.
    #[error("Artifact storage failed: {0}")]
    Artifact(#[from] ArtifactError),
}

/// Tracks counters for the processing pool.
#[derive(Default)]
pub struct PipelineStats {
    pub(super) active: AtomicU64,
    pub(super) queued: AtomicU64,
    pub(super) total_ready: AtomicU64,
    pub(super) total_failed: AtomicU64,
}

impl PipelineStats {
    pub(super) fn to_status(&self, max_parallel_jobs: usize) -> PipelineStatus {
        PipelineStatus {
            active_jobs: self.active.load(Ordering::Relaxed) as usize,
            queued_jobs: self.queued.load(Ordering::Relaxed) as usize,
            max_parallel_jobs,
            total_ready: self.total_ready.load(Ordering::Relaxed),
            total_failed: self.total_failed.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of pipeline activity.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineStatus {
    pub active_jobs: usize,
    pub queued_jobs: usize,
    pub max_parallel_jobs: usize,
    pub total_ready: u64,
    pub total_failed: u64,
}
