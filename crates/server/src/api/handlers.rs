use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use add2wallet_core::SanitizedConfig;

use crate::metrics::{collect_dynamic_metrics, encode_metrics};
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub signing_enabled: bool,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        signing_enabled: state.signing_enabled(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> String {
    collect_dynamic_metrics(&state);
    encode_metrics()
}

#[derive(Serialize)]
pub struct IndexResponse {
    pub service: String,
    pub version: String,
}

pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        service: "add2wallet".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
