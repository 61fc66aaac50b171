//! Prometheus metrics for core components.
//!
//! Covers the processing pipeline (validation, building, signing, storage)
//! and tool provisioning.

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Pipeline Metrics
// =============================================================================

/// Jobs submitted to the pipeline.
pub static JOBS_SUBMITTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "add2wallet_jobs_submitted_total",
        "Total jobs submitted to the pipeline",
    )
    .unwrap()
});

/// Jobs finished by result.
pub static JOBS_FINISHED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("add2wallet_jobs_finished_total", "Total jobs finished"),
        &["result"], // "ready", "failed"
    )
    .unwrap()
});

/// Job processing duration in seconds.
pub static JOB_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "add2wallet_job_duration_seconds",
            "Duration of pipeline processing per job",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["result"],
    )
    .unwrap()
});

/// PDF validation failures by reason.
pub static PDF_REJECTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "add2wallet_pdf_rejections_total",
            "Total PDFs rejected by structural validation",
        ),
        &["reason"], // "empty", "not_a_pdf", "truncated", "encrypted", "no_pages"
    )
    .unwrap()
});

/// Passes packaged, by signing mode.
pub static PASSES_PACKAGED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("add2wallet_passes_packaged_total", "Total passes packaged"),
        &["mode"], // "signed", "unsigned"
    )
    .unwrap()
});

/// Pass validation findings logged.
pub static PASS_FINDINGS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "add2wallet_pass_findings_total",
        "Total advisory findings from pass validation",
    )
    .unwrap()
});

/// Artifact bytes written.
pub static ARTIFACT_BYTES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "add2wallet_artifact_bytes_total",
        "Total bytes written to artifact storage",
    )
    .unwrap()
});

// =============================================================================
// Provisioning Metrics
// =============================================================================

/// Tool install attempts by method and result.
pub static PROVISION_ATTEMPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "add2wallet_provision_attempts_total",
            "Total tool install attempts",
        ),
        &["method", "result"], // result: "success", "failed", "unavailable"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(JOBS_SUBMITTED.clone()),
        Box::new(JOBS_FINISHED.clone()),
        Box::new(JOB_DURATION.clone()),
        Box::new(PDF_REJECTIONS.clone()),
        Box::new(PASSES_PACKAGED.clone()),
        Box::new(PASS_FINDINGS.clone()),
        Box::new(ARTIFACT_BYTES.clone()),
        Box::new(PROVISION_ATTEMPTS.clone()),
    ]
}
