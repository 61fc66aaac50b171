use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::{handlers, jobs, middleware as mw, passes, upload};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Leave headroom above the upload limit for the multipart framing.
    let body_limit = state.config().storage.max_upload_bytes as usize + 64 * 1024;

    let authed = Router::new()
        .route("/upload", post(upload::upload))
        .route("/status/{job_id}", get(jobs::status))
        .route("/pass/{job_id}", get(passes::download))
        .route("/passes", get(jobs::list_passes))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            mw::auth_middleware,
        ));

    let open = Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::metrics));

    Router::new()
        .merge(authed)
        .merge(open)
        .layer(middleware::from_fn(mw::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
