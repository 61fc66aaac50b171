//! Common test utilities for in-process API testing.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use add2wallet_core::artifact::{ArtifactError, ArtifactStore, FsArtifactStore};
use add2wallet_core::config::{AuthConfig, Config};
use add2wallet_core::extract::FilenameExtractor;
use add2wallet_core::pdf::{PdfError, PdfInfo, PdfValidator, StructuralValidator};
use add2wallet_core::pipeline::{PassPipeline, PipelineConfig};
use add2wallet_core::signer::PassSigner;
use add2wallet_core::{AuthMethod, Authenticator, JobStore, NoneAuthenticator, SqliteJobStore};

use add2wallet_server::api::create_router;
use add2wallet_server::state::AppState;

/// Re-export fixtures for test convenience
pub use add2wallet_core::testing::fixtures;

const MULTIPART_BOUNDARY: &str = "----test-boundary-7b2e9f";

/// In-process server fixture backed by temp directories.
pub struct TestFixture {
    pub router: Router,
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub bytes: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.bytes).expect("Response body is not JSON")
    }
}

/// Artifact store whose writes always fail, for driving jobs into `Failed`.
pub struct FailingArtifactStore;

#[async_trait::async_trait]
impl ArtifactStore for FailingArtifactStore {
    async fn put(&self, _job_id: &str, _bytes: &[u8]) -> Result<u64, ArtifactError> {
        Err(ArtifactError::Io(std::io::Error::other("disk full")))
    }

    async fn get(&self, job_id: &str) -> Result<Vec<u8>, ArtifactError> {
        Err(ArtifactError::NotFound(job_id.to_string()))
    }

    async fn exists(&self, _job_id: &str) -> Result<bool, ArtifactError> {
        Ok(false)
    }
}

/// Validator that rejects every document.
pub struct RejectAllValidator;

impl PdfValidator for RejectAllValidator {
    fn validate(&self, _bytes: &[u8]) -> Result<PdfInfo, PdfError> {
        Err(PdfError::NoPages)
    }
}

impl TestFixture {
    /// Fixture with auth disabled.
    pub fn new() -> Self {
        Self::build(Arc::new(NoneAuthenticator::new()), None, None)
    }

    /// Fixture with a specific authenticator.
    pub fn with_authenticator(authenticator: Arc<dyn Authenticator>) -> Self {
        Self::build(authenticator, None, None)
    }

    /// Fixture whose artifact store rejects every write.
    pub fn with_failing_artifact_store() -> Self {
        Self::build(
            Arc::new(NoneAuthenticator::new()),
            Some(Arc::new(FailingArtifactStore)),
            None,
        )
    }

    /// Fixture with a specific PDF validator shared by intake and pipeline.
    pub fn with_pdf_validator(validator: Arc<dyn PdfValidator>) -> Self {
        Self::build(Arc::new(NoneAuthenticator::new()), None, Some(validator))
    }

    fn build(
        authenticator: Arc<dyn Authenticator>,
        artifacts: Option<Arc<dyn ArtifactStore>>,
        pdf_validator: Option<Arc<dyn PdfValidator>>,
    ) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

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
        config.database.path = temp_dir.path().join("test.db");
        config.storage.upload_dir = temp_dir.path().join("uploads");
        config.storage.artifact_dir = temp_dir.path().join("passes");

        let jobs: Arc<dyn JobStore> = Arc::new(
            SqliteJobStore::new(&config.database.path).expect("Failed to create job store"),
        );
        let artifacts: Arc<dyn ArtifactStore> = artifacts
            .unwrap_or_else(|| Arc::new(FsArtifactStore::new(config.storage.artifact_dir.clone())));
        let pdf_validator: Arc<dyn PdfValidator> =
            pdf_validator.unwrap_or_else(|| Arc::new(StructuralValidator::new()));

        let pipeline = Arc::new(PassPipeline::new(
            PipelineConfig::default(),
            Arc::clone(&jobs),
            Arc::clone(&artifacts),
            Arc::clone(&pdf_validator),
            Arc::new(FilenameExtractor::new()),
            PassSigner::new(None),
            config.wallet.clone(),
            None,
        ));

        let state = Arc::new(AppState::new(
            config,
            authenticator,
            jobs,
            artifacts,
            pdf_validator,
            pipeline,
            false,
        ));

        Self {
            router: create_router(state),
            temp_dir,
        }
    }

    /// Send a GET request.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .uri(path)
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(request).await
    }

    /// Upload a file through the multipart endpoint.
    pub async fn upload(&self, filename: &str, file: &[u8], user_id: &str) -> TestResponse {
        let body = multipart_body(filename, file, user_id, Some("test-session-token"));
        let request = Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
            )
            .body(Body::from(body))
            .expect("Failed to build request");
        self.send(request).await
    }

    /// Poll `/status/{job_id}` until the job reaches a terminal state.
    pub async fn wait_for_job(&self, job_id: &str) -> Value {
        for _ in 0..200 {
            let response = self.get(&format!("/status/{}", job_id)).await;
            assert_eq!(response.status, StatusCode::OK);
            let json = response.json();
            let status = json["status"].as_str().unwrap_or_default().to_string();
            if status == "ready" || status == "failed" {
                return json;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("Job {} did not finish in time", job_id);
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes()
            .to_vec();

        TestResponse {
            status,
            headers,
            bytes,
        }
    }
}

/// Build a multipart/form-data body with file, user_id and session_token.
pub fn multipart_body(
    filename: &str,
    file: &[u8],
    user_id: &str,
    session_token: Option<&str>,
) -> Vec<u8> {
    let mut body = Vec::new();

    body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
    body.extend_from_slice(file);
    body.extend_from_slice(b"\r\n");

    body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"user_id\"\r\n\r\n");
    body.extend_from_slice(user_id.as_bytes());
    body.extend_from_slice(b"\r\n");

    if let Some(token) = session_token {
        body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
        body.extend_from_slice(
            b"Content-Disposition: form-data; name=\"session_token\"\r\n\r\n",
        );
        body.extend_from_slice(token.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());
    body
}
