//! PDF upload endpoint.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use add2wallet_core::pdf::PdfValidator;
use add2wallet_core::CreateJobRequest;

use super::error::ApiError;
use super::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub job_id: String,
    pub status: String,
}

struct UploadForm {
    file_bytes: Vec<u8>,
    filename: String,
    user_id: String,
    session_token: Option<String>,
}

/// Accept a PDF upload, register a job and hand it to the pipeline.
///
/// The multipart form carries `file`, `user_id` and `session_token`.
/// Session tokens are opaque here; validating them is the account
/// service's job.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    AuthUser(auth_user): AuthUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let max_bytes = state.config().storage.max_upload_bytes;
    let form = read_form(multipart, max_bytes).await?;

    if !form.filename.to_lowercase().ends_with(".pdf") {
        return Err(ApiError::bad_request("Only PDF files are accepted"));
    }

    state
        .pdf_validator()
        .validate(&form.file_bytes)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let job = state.jobs().create(CreateJobRequest {
        user_id: form.user_id.clone(),
        filename: form.filename.clone(),
    })?;

    // Stage the original upload next to the artifacts for troubleshooting.
    let upload_dir = &state.config().storage.upload_dir;
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(ApiError::internal)?;
    tokio::fs::write(upload_dir.join(format!("{}.pdf", job.id)), &form.file_bytes)
        .await
        .map_err(ApiError::internal)?;

    info!(
        job_id = %job.id,
        user_id = %form.user_id,
        auth_user = %auth_user,
        filename = %form.filename,
        size = form.file_bytes.len(),
        has_session_token = form.session_token.is_some(),
        "Upload accepted"
    );

    state.pipeline().submit(job.id.clone(), form.file_bytes);

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            job_id: job.id,
            status: job.state.state_type().to_string(),
        }),
    ))
}

async fn read_form(mut multipart: Multipart, max_bytes: u64) -> Result<UploadForm, ApiError> {
    let mut file_bytes = None;
    let mut filename = None;
    let mut user_id = None;
    let mut session_token = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {}", e)))?
    {
        match field.name() {
            Some("file") => {
                filename = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read file: {}", e)))?;
                if bytes.len() as u64 > max_bytes {
                    warn!(size = bytes.len(), max_bytes, "Upload too large");
                    return Err(ApiError::payload_too_large(max_bytes));
                }
                file_bytes = Some(bytes.to_vec());
            }
            Some("user_id") => {
                user_id = Some(read_text_field(field).await?);
            }
            Some("session_token") => {
                session_token = Some(read_text_field(field).await?);
            }
            Some(other) => {
                debug!(field = other, "Ignoring unknown multipart field");
            }
            None => {}
        }
    }

    let file_bytes = file_bytes.ok_or_else(|| ApiError::bad_request("Missing file field"))?;
    let filename = filename.unwrap_or_else(|| "upload.pdf".to_string());
    let user_id = user_id
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing user_id field"))?;

    Ok(UploadForm {
        file_bytes,
        filename,
        user_id,
        session_token,
    })
}

async fn read_text_field(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to read form field: {}", e)))
}
