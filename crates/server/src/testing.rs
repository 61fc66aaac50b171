//! Unit-test helpers for building an in-memory application state.

use std::sync::Arc;

use add2wallet_core::artifact::ArtifactStore;
use add2wallet_core::config::{AuthConfig, Config};
use add2wallet_core::extract::FilenameExtractor;
use add2wallet_core::pdf::{PdfValidator, StructuralValidator};
use add2wallet_core::pipeline::{PassPipeline, PipelineConfig};
use add2wallet_core::signer::PassSigner;
use add2wallet_core::testing::MemoryArtifactStore;
use add2wallet_core::{AuthMethod, Authenticator, JobStore, SqliteJobStore};

use crate::state::AppState;

/// In-memory state with the given authenticator and no signing bundle.
pub fn test_state(authenticator: Arc<dyn Authenticator>) -> Arc<AppState> {
    let temp_dir = tempfile::tempdir().unwrap();

    let mut config = Config {
        auth: AuthConfig {
            method: AuthMethod::None,
            api_key: None,
        },
        server: Default::default(),
        database: Default::default(),
        storage: Default::default(),
        certificates: Default::default(),
        wallet: Default::default(),
        pipeline: Default::default(),
        tools: None,
    };
    config.storage.upload_dir = temp_dir.path().join("uploads");
    config.storage.artifact_dir = temp_dir.path().join("passes");

    // Keep the temp dir alive for the life of the test process.
    std::mem::forget(temp_dir);

    let jobs: Arc<dyn JobStore> = Arc::new(SqliteJobStore::in_memory().unwrap());
    let artifacts: Arc<dyn ArtifactStore> = Arc::new(MemoryArtifactStore::new());
    let pdf_validator: Arc<dyn PdfValidator> = Arc::new(StructuralValidator::new());

    let pipeline = PassPipeline::new(
        PipelineConfig::default(),
        Arc::clone(&jobs),
        Arc::clone(&artifacts),
        Arc::clone(&pdf_validator),
        Arc::new(FilenameExtractor::new()),
        PassSigner::new(None),
        config.wallet.clone(),
        None,
    );

    Arc::new(AppState::new(
        config,
        authenticator,
        jobs,
        artifacts,
        pdf_validator,
        Arc::new(pipeline),
        false,
    ))
}
