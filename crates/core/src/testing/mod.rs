//! Test fixtures shared across the crate and downstream test suites.

pub mod certs;
pub mod fixtures;

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::artifact::{ArtifactError, ArtifactStore};

/// In-memory artifact store for tests.
#[derive(Default)]
pub struct MemoryArtifactStore {
    artifacts: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn put(&self, job_id: &str, bytes: &[u8]) -> Result<u64, ArtifactError> {
        let mut artifacts = self
            .artifacts
            .lock()
            .map_err(|_| ArtifactError::NotFound("poisoned lock".to_string()))?;
        if artifacts.contains_key(job_id) {
            return Err(ArtifactError::AlreadyExists(job_id.to_string()));
        }
        artifacts.insert(job_id.to_string(), bytes.to_vec());
        Ok(bytes.len() as u64)
    }

    async fn get(&self, job_id: &str) -> Result<Vec<u8>, ArtifactError> {
        let artifacts = self
            .artifacts
            .lock()
            .map_err(|_| ArtifactError::NotFound("poisoned lock".to_string()))?;
        artifacts
            .get(job_id)
            .cloned()
            .ok_or_else(|| ArtifactError::NotFound(job_id.to_string()))
    }

    async fn exists(&self, job_id: &str) -> Result<bool, ArtifactError> {
        let artifacts = self
            .artifacts
            .lock()
            .map_err(|_| ArtifactError::NotFound("poisoned lock".to_string()))?;
        Ok(artifacts.contains_key(job_id))
    }
}
