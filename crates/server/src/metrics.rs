//! Prometheus metrics for the HTTP server.
//!
//! HTTP request metrics are recorded by middleware; job and pipeline gauges
//! are collected dynamically right before encoding.

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts,
    Registry, TextEncoder,
};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "add2wallet_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("add2wallet_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "add2wallet_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

/// Authentication failures.
pub static AUTH_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "add2wallet_auth_failures_total",
            "Total authentication failures",
        ),
        &["reason"],
    )
    .unwrap()
});

// =============================================================================
// Job Metrics (collected dynamically)
// =============================================================================

/// Jobs by current state.
pub static JOBS_BY_STATE: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("add2wallet_jobs_by_state", "Current job count by state"),
        &["state"],
    )
    .unwrap()
});

/// Pipeline active jobs.
pub static PIPELINE_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "add2wallet_pipeline_active",
        "Number of jobs currently being processed",
    )
    .unwrap()
});

/// Pipeline queued jobs.
pub static PIPELINE_QUEUED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "add2wallet_pipeline_queued",
        "Number of jobs waiting for a processing slot",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();
    registry
        .register(Box::new(AUTH_FAILURES_TOTAL.clone()))
        .unwrap();

    registry.register(Box::new(JOBS_BY_STATE.clone())).unwrap();
    registry
        .register(Box::new(PIPELINE_ACTIVE.clone()))
        .unwrap();
    registry
        .register(Box::new(PIPELINE_QUEUED.clone()))
        .unwrap();

    // Core metrics (pipeline counters, provisioning)
    for metric in add2wallet_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Update gauges with current values from the job store and pipeline.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let status = state.pipeline().status();
    PIPELINE_ACTIVE.set(status.active_jobs as i64);
    PIPELINE_QUEUED.set(status.queued_jobs as i64);

    let jobs = state.jobs();
    for state_type in ["pending", "processing", "ready", "failed"] {
        let filter = add2wallet_core::JobFilter::new().with_state(state_type);
        if let Ok(count) = jobs.count(&filter) {
            JOBS_BY_STATE.with_label_values(&[state_type]).set(count);
        }
    }
}

static UUID_REGEX: Lazy<regex_lite::Regex> = Lazy::new(|| {
    regex_lite::Regex::new(
        r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
    )
    .unwrap()
});

static NUMERIC_REGEX: Lazy<regex_lite::Regex> =
    Lazy::new(|| regex_lite::Regex::new(r"/\d+(/|$)").unwrap());

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    let result = UUID_REGEX.replace_all(path, "{id}");
    let result = NUMERIC_REGEX.replace_all(&result, "/{id}$1");
    result.to_string()
}
