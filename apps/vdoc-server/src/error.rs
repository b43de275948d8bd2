//! Error types for the VDoc server

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::crop::CropError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// An upstream model or OCR call failed; the message is user-facing
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Crop error: {0}")]
    Crop(#[from] CropError),

    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Upstream(msg) => (StatusCode::BAD_GATEWAY, "upstream_error", msg.clone()),
            AppError::Crop(e) => match e {
                CropError::EncodeError(_) => {
                    tracing::error!("Crop encode error: {}", e);
                    (e.status_code(), "encode_error", "Failed to encode image".to_string())
                }
                CropError::DecodeError(_) => (e.status_code(), "decode_error", e.to_string()),
                CropError::InvalidRegion(_) => (e.status_code(), "invalid_region", e.to_string()),
            },
            AppError::Multipart(e) => (e.status(), "bad_request", e.body_text()),
            AppError::Join(e) => {
                tracing::error!("Blocking task failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
            details: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
        });

        (status, body).into_response()
    }
}
