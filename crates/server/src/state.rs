use std::sync::Arc;

use add2wallet_core::artifact::ArtifactStore;
use add2wallet_core::pdf::PdfValidator;
use add2wallet_core::pipeline::PassPipeline;
use add2wallet_core::{Authenticator, Config, JobStore, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    authenticator: Arc<dyn Authenticator>,
    jobs: Arc<dyn JobStore>,
    artifacts: Arc<dyn ArtifactStore>,
    pdf_validator: Arc<dyn PdfValidator>,
    pipeline: Arc<PassPipeline>,
    signing_enabled: bool,
}

impl AppState {
    pub fn new(
        config: Config,
        authenticator: Arc<dyn Authenticator>,
        jobs: Arc<dyn JobStore>,
        artifacts: Arc<dyn ArtifactStore>,
        pdf_validator: Arc<dyn PdfValidator>,
        pipeline: Arc<PassPipeline>,
        signing_enabled: bool,
    ) -> Self {
        Self {
            config,
            authenticator,
            jobs,
            artifacts,
            pdf_validator,
            pipeline,
            signing_enabled,
        }
    }

    pub fn signing_enabled(&self) -> bool {
        self.signing_enabled
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    pub fn jobs(&self) -> &dyn JobStore {
        self.jobs.as_ref()
    }

    pub fn artifacts(&self) -> &dyn ArtifactStore {
        self.artifacts.as_ref()
    }

    /// The same validator the pipeline runs, so intake and processing
    /// cannot disagree on what a well-formed PDF is.
    pub fn pdf_validator(&self) -> &dyn PdfValidator {
        self.pdf_validator.as_ref()
    }

    pub fn pipeline(&self) -> &PassPipeline {
        &self.pipeline
    }
}
