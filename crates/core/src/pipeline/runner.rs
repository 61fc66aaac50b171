//! The pass pipeline: PDF in, stored .pkpass artifact out.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::artifact::ArtifactStore;
use crate::certificates::PassIdentifiers;
use crate::config::WalletConfig;
use crate::extract::MetadataExtractor;
use crate::job::{JobState, JobStore};
use crate::metrics;
use crate::pdf::{PdfError, PdfValidator};
use crate::signer::PassSigner;
use crate::wallet::{build_pass, validate_pass};

use super::config::PipelineConfig;
use super::types::{PipelineError, PipelineStats, PipelineStatus};

/// Processes uploaded PDFs into stored pass artifacts.
///
/// Submission is fire-and-forget: each job runs on its own task, gated by
/// a semaphore so at most `max_parallel_jobs` are in flight. Every outcome
/// lands in the job registry as either `Ready` or `Failed`.
pub struct PassPipeline {
    jobs: Arc<dyn JobStore>,
    artifacts: Arc<dyn ArtifactStore>,
    validator: Arc<dyn PdfValidator>,
    extractor: Arc<dyn MetadataExtractor>,
    signer: Arc<PassSigner>,
    wallet: WalletConfig,
    identifiers: Option<PassIdentifiers>,
    semaphore: Arc<Semaphore>,
    stats: Arc<PipelineStats>,
    max_parallel_jobs: usize,
}

impl PassPipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: PipelineConfig,
        jobs: Arc<dyn JobStore>,
        artifacts: Arc<dyn ArtifactStore>,
        validator: Arc<dyn PdfValidator>,
        extractor: Arc<dyn MetadataExtractor>,
        signer: PassSigner,
        wallet: WalletConfig,
        identifiers: Option<PassIdentifiers>,
    ) -> Self {
        let max_parallel_jobs = config.max_parallel_jobs.max(1);
        Self {
            jobs,
            artifacts,
            validator,
            extractor,
            signer: Arc::new(signer),
            wallet,
            identifiers,
            semaphore: Arc::new(Semaphore::new(max_parallel_jobs)),
            stats: Arc::new(PipelineStats::default()),
            max_parallel_jobs,
        }
    }

    /// Returns the current pipeline status.
    pub fn status(&self) -> PipelineStatus {
        self.stats.to_status(self.max_parallel_jobs)
    }

    /// Submit a job for background processing.
    ///
    /// Returns immediately. The handle resolves once the job has reached a
    /// terminal state; callers normally drop it, tests await it.
    pub fn submit(&self, job_id: String, pdf_bytes: Vec<u8>) -> JoinHandle<()> {
        metrics::JOBS_SUBMITTED.inc();
        self.stats
            .queued
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);

        let worker = Worker {
            jobs: Arc::clone(&self.jobs),
            artifacts: Arc::clone(&self.artifacts),
            validator: Arc::clone(&self.validator),
            extractor: Arc::clone(&self.extractor),
            signer: Arc::clone(&self.signer),
            wallet: self.wallet.clone(),
            identifiers: self.identifiers.clone(),
            semaphore: Arc::clone(&self.semaphore),
            stats: Arc::clone(&self.stats),
        };

        tokio::spawn(async move { worker.run(job_id, pdf_bytes).await })
    }
}

struct Worker {
    jobs: Arc<dyn JobStore>,
    artifacts: Arc<dyn ArtifactStore>,
    validator: Arc<dyn PdfValidator>,
    extractor: Arc<dyn MetadataExtractor>,
    signer: Arc<PassSigner>,
    wallet: WalletConfig,
    identifiers: Option<PassIdentifiers>,
    semaphore: Arc<Semaphore>,
    stats: Arc<PipelineStats>,
}

impl Worker {
    async fn run(self, job_id: String, pdf_bytes: Vec<u8>) {
        use std::sync::atomic::Ordering;

        let permit = match self.semaphore.acquire().await {
            Ok(permit) => permit,
            Err(_) => return,
        };
        self.stats.queued.fetch_sub(1, Ordering::Relaxed);
        self.stats.active.fetch_add(1, Ordering::Relaxed);

        let start = Instant::now();
        let result = self.process(&job_id, &pdf_bytes).await;
        let elapsed = start.elapsed().as_secs_f64();

        match result {
            Ok(outcome) => {
                self.stats.total_ready.fetch_add(1, Ordering::Relaxed);
                metrics::JOBS_FINISHED.with_label_values(&["ready"]).inc();
                metrics::JOB_DURATION
                    .with_label_values(&["ready"])
                    .observe(elapsed);
                info!(
                    job_id,
                    size = outcome.artifact_size_bytes,
                    signed = outcome.signed,
                    "Job completed"
                );
                self.finish(
                    &job_id,
                    JobState::Ready {
                        completed_at: Utc::now(),
                        artifact_size_bytes: outcome.artifact_size_bytes,
                        signed: outcome.signed,
                    },
                );
            }
            Err(e) => {
                self.stats.total_failed.fetch_add(1, Ordering::Relaxed);
                metrics::JOBS_FINISHED.with_label_values(&["failed"]).inc();
                metrics::JOB_DURATION
                    .with_label_values(&["failed"])
                    .observe(elapsed);
                if let PipelineError::Pdf(ref pdf_error) = e {
                    metrics::PDF_REJECTIONS
                        .with_label_values(&[rejection_reason(pdf_error)])
                        .inc();
                }
                warn!(job_id, error = %e, "Job failed");
                self.finish(
                    &job_id,
                    JobState::Failed {
                        error: e.to_string(),
                        failed_at: Utc::now(),
                    },
                );
            }
        }

        self.stats.active.fetch_sub(1, Ordering::Relaxed);
        drop(permit);
    }

    async fn process(&self, job_id: &str, pdf_bytes: &[u8]) -> Result<Outcome, PipelineError> {
        self.jobs.update_state(
            job_id,
            JobState::Processing {
                started_at: Utc::now(),
            },
        )?;

        let info = self.validator.validate(pdf_bytes)?;

        let job = self
            .jobs
            .get(job_id)?
            .ok_or_else(|| PipelineError::JobNotFound(job_id.to_string()))?;

        let metadata = self.extractor.extract(&job.filename, &info);
        let pass = build_pass(&metadata, job_id, &self.wallet, self.identifiers.as_ref());

        let findings = validate_pass(&pass);
        if !findings.is_empty() {
            metrics::PASS_FINDINGS.inc_by(findings.len() as u64);
            for finding in &findings {
                warn!(job_id, finding, "Pass validation finding");
            }
        }

        let pass_json = serde_json::to_vec_pretty(&pass)?;
        let archive = self.signer.package(&pass_json, &[])?;
        let signed = self.signer.signing_enabled();

        let artifact_size_bytes = self.artifacts.put(job_id, &archive).await?;
        metrics::ARTIFACT_BYTES.inc_by(artifact_size_bytes);
        metrics::PASSES_PACKAGED
            .with_label_values(&[if signed { "signed" } else { "unsigned" }])
            .inc();

        Ok(Outcome {
            artifact_size_bytes,
            signed,
        })
    }

    fn finish(&self, job_id: &str, state: JobState) {
        if let Err(e) = self.jobs.update_state(job_id, state) {
            error!(job_id, error = %e, "Failed to record job outcome");
        }
    }
}

struct Outcome {
    artifact_size_bytes: u64,
    signed: bool,
}

fn rejection_reason(error: &PdfError) -> &'static str {
    match error {
        PdfError::Empty => "empty",
        PdfError::NotAPdf => "not_a_pdf",
        PdfError::Truncated => "truncated",
        PdfError::Encrypted => "encrypted",
        PdfError::NoPages => "no_pages",
    }
}
