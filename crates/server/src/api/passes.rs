//! Pass artifact download endpoint.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use add2wallet_core::JobState;

use super::error::ApiError;
use crate::state::AppState;

const PKPASS_CONTENT_TYPE: &str = "application/vnd.apple.pkpass";

/// Download the .pkpass artifact for a finished job.
///
/// A job that exists but has not produced its artifact yet is a conflict,
/// not a missing resource; clients poll `/status/{job_id}` until ready.
pub async fn download(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Response, ApiError> {
    let job = state
        .jobs()
        .get(&job_id)?
        .ok_or_else(|| ApiError::not_found(format!("Job not found: {}", job_id)))?;

    match job.state {
        JobState::Ready { .. } => {}
        JobState::Failed { ref error, .. } => {
            return Err(ApiError::conflict(format!(
                "Job {} failed: {}",
                job_id, error
            )));
        }
        _ => {
            return Err(ApiError::conflict(format!(
                "Job {} is not ready yet (status: {})",
                job_id,
                job.state.state_type()
            )));
        }
    }

    // A Ready job without its artifact means storage was tampered with.
    let bytes = state
        .artifacts()
        .get(&job_id)
        .await
        .map_err(ApiError::internal)?;

    let download_name = format!("{}.pkpass", pass_stem(&job.filename));

    Ok((
        [
            (header::CONTENT_TYPE, PKPASS_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", download_name),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// Safe filename stem for the Content-Disposition header.
fn pass_stem(filename: &str) -> String {
    let stem = filename
        .trim_end_matches(".pdf")
        .trim_end_matches(".PDF");
    let cleaned: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "pass".to_string()
    } else {
        cleaned
    }
}
