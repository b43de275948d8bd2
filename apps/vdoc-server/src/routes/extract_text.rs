//! Text extraction endpoint
//!
//! `POST /api/extract-text` takes a multipart upload in field `file` and
//! answers with the text the OCR gateway found in it.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};

use crate::ocr::ExtractTextResponse;
use crate::state::AppState;

/// Upload name used when the client sends none
const DEFAULT_FILE_NAME: &str = "upload";

/// Run OCR on an uploaded image
pub async fn extract_text(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> (StatusCode, Json<ExtractTextResponse>) {
    let mut upload = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Failed to read multipart field: {}", e);
                break;
            }
        };

        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_FILE_NAME)
            .to_string();

        match field.bytes().await {
            Ok(data) => {
                upload = Some((file_name, data));
                break;
            }
            Err(e) => {
                tracing::warn!("Failed to read file data: {}", e);
                break;
            }
        }
    }

    let Some((file_name, data)) = upload else {
        return (StatusCode::BAD_REQUEST, Json(ExtractTextResponse::rejected()));
    };

    tracing::debug!("Extracting text from '{}' ({} bytes)", file_name, data.len());

    match state.ocr().extract_text(&file_name, &data).await {
        Ok(text) => (StatusCode::OK, Json(ExtractTextResponse::text(text))),
        Err(e) => {
            tracing::error!("Error extracting text from '{}': {}", file_name, e);
            (
                e.status_code(),
                Json(ExtractTextResponse::failed("Failed to extract text")),
            )
        }
    }
}
