//! Filesystem-backed artifact store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::{ArtifactError, ArtifactStore};

/// Stores artifacts as `{job_id}.pkpass` files under a directory.
///
/// Writes go through a temp file followed by a rename, so readers never
/// observe a partially written archive.
pub struct FsArtifactStore {
    dir: PathBuf,
}

impl FsArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn artifact_path(&self, job_id: &str) -> PathBuf {
        self.dir.join(format!("{}.pkpass", job_id))
    }

    fn temp_path(&self, job_id: &str) -> PathBuf {
        self.dir.join(format!(".{}.pkpass.tmp", job_id))
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn put(&self, job_id: &str, bytes: &[u8]) -> Result<u64, ArtifactError> {
        let path = self.artifact_path(job_id);
        if path_exists(&path).await {
            return Err(ArtifactError::AlreadyExists(job_id.to_string()));
        }

        tokio::fs::create_dir_all(&self.dir).await?;

        let temp = self.temp_path(job_id);
        tokio::fs::write(&temp, bytes).await?;
        if let Err(e) = tokio::fs::rename(&temp, &path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }

        debug!(job_id, size = bytes.len(), "Stored artifact");
        Ok(bytes.len() as u64)
    }

    async fn get(&self, job_id: &str) -> Result<Vec<u8>, ArtifactError> {
        let path = self.artifact_path(job_id);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ArtifactError::NotFound(job_id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, job_id: &str) -> Result<bool, ArtifactError> {
        Ok(path_exists(&self.artifact_path(job_id)).await)
    }
}

async fn path_exists(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, FsArtifactStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(dir.path().join("passes"));
        (dir, store)
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let (_dir, store) = store();

        let size = store.put("job-1", b"archive bytes").await.unwrap();
        assert_eq!(size, 13);

        let bytes = store.get("job-1").await.unwrap();
        assert_eq!(bytes, b"archive bytes");
        assert!(store.exists("job-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_get_missing() {
        let (_dir, store) = store();
        let result = store.get("nope").await;
        assert!(matches!(result, Err(ArtifactError::NotFound(_))));
        assert!(!store.exists("nope").await.unwrap());
    }

    #[tokio::test]
    async fn test_put_twice_rejected() {
        let (_dir, store) = store();
        store.put("job-1", b"first").await.unwrap();

        let result = store.put("job-1", b"second").await;
        assert!(matches!(result, Err(ArtifactError::AlreadyExists(_))));

        // Original bytes untouched.
        assert_eq!(store.get("job-1").await.unwrap(), b"first");
    }

    #[tokio::test]
    async fn test_no_temp_file_left_behind() {
        let (dir, store) = store();
        store.put("job-1", b"bytes").await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path().join("passes"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(entries, vec!["job-1.pkpass"]);
    }
}
