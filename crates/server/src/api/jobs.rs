//! Job status and listing endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use add2wallet_core::{Job, JobFilter, JobState};

use super::error::ApiError;
use crate::state::AppState;

/// Maximum allowed limit for job queries
const MAX_LIMIT: i64 = 1000;

/// Default limit for job queries
const DEFAULT_LIMIT: i64 = 100;

#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub job_id: String,
    pub status: String,
    /// Coarse progress: 0 pending, 50 processing, 100 terminal.
    pub progress: u8,
    pub filename: String,
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Where to download the artifact once the job is ready.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed: Option<bool>,
}

impl From<Job> for JobStatusResponse {
    fn from(job: Job) -> Self {
        let (pass_url, signed) = match job.state {
            JobState::Ready { signed, .. } => (Some(format!("/pass/{}", job.id)), Some(signed)),
            _ => (None, None),
        };

        Self {
            job_id: job.id,
            status: job.state.state_type().to_string(),
            progress: job.state.progress(),
            filename: job.filename,
            user_id: job.user_id,
            created_at: job.created_at.to_rfc3339(),
            updated_at: job.updated_at.to_rfc3339(),
            error: job.state.failure_reason().map(str::to_string),
            pass_url,
            signed,
        }
    }
}

/// Query parameters for listing passes
#[derive(Debug, Deserialize)]
pub struct ListPassesParams {
    /// Filter by owning user
    pub user_id: Option<String>,
    /// Filter by state type
    pub status: Option<String>,
    /// Maximum number of jobs to return
    pub limit: Option<i64>,
    /// Pagination offset
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ListPassesResponse {
    pub passes: Vec<JobStatusResponse>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Get the status of a single job.
pub async fn status(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Json<JobStatusResponse>, ApiError> {
    let job = state
        .jobs()
        .get(&job_id)?
        .ok_or_else(|| ApiError::not_found(format!("Job not found: {}", job_id)))?;

    Ok(Json(JobStatusResponse::from(job)))
}

/// List jobs, newest first.
pub async fn list_passes(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListPassesParams>,
) -> Result<Json<ListPassesResponse>, ApiError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_LIMIT)
        .clamp(1, MAX_LIMIT);
    let offset = params.offset.unwrap_or(0).max(0);

    let mut filter = JobFilter::new().with_limit(limit).with_offset(offset);
    if let Some(user_id) = params.user_id {
        filter = filter.with_user_id(user_id);
    }
    if let Some(status) = params.status {
        filter = filter.with_state(status);
    }

    let jobs = state.jobs().list(&filter)?;
    let total = state.jobs().count(&filter)?;

    Ok(Json(ListPassesResponse {
        passes: jobs.into_iter().map(JobStatusResponse::from).collect(),
        total,
        limit,
        offset,
    }))
}
