//! Route modules for VDoc Server

pub mod crop;
pub mod extract_text;
pub mod health;
pub mod obj_detect;
pub mod pages;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Build the application router
pub fn router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes());

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/health", get(health::health_check))
        .route("/api/extract-text", post(extract_text::extract_text))
        .route("/api/obj-detect", post(obj_detect::obj_detect))
        .route("/api/crop", post(crop::crop))
        .nest("/api/pages", pages::router())
        .layer(body_limit)
        .with_state(state)
}
