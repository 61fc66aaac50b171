//! Pipeline configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the pass pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum jobs processed concurrently; the rest queue.
    pub max_parallel_jobs: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_parallel_jobs: 2,
        }
    }
}
