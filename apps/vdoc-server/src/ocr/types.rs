//! OCR Types
//!
//! Defines types for text detection on uploaded images.

use serde::{Deserialize, Serialize};

/// One text annotation; the first one covers the whole image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnnotation {
    /// Recognized text
    #[serde(default)]
    pub description: String,
    /// Detected language (BCP-47), if reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

/// Body returned by the extract-text endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractTextResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractTextResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            success: true,
            text: Some(text.into()),
            error: None,
        }
    }

    /// `{success: false}` with no further detail
    pub fn rejected() -> Self {
        Self {
            success: false,
            text: None,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            text: None,
            error: Some(error.into()),
        }
    }
}

/// OCR error types
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("Failed to stage upload: {0}")]
    Staging(#[from] std::io::Error),

    #[error("Request to OCR service failed: {0}")]
    Http(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Failed to parse OCR response: {0}")]
    InvalidResponse(String),
}

impl OcrError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        axum::http::StatusCode::INTERNAL_SERVER_ERROR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_shapes() {
        assert_eq!(
            serde_json::to_value(ExtractTextResponse::text("")).unwrap(),
            json!({ "success": true, "text": "" })
        );
        assert_eq!(
            serde_json::to_value(ExtractTextResponse::rejected()).unwrap(),
            json!({ "success": false })
        );
        assert_eq!(
            serde_json::to_value(ExtractTextResponse::failed("Failed to extract text")).unwrap(),
            json!({ "success": false, "error": "Failed to extract text" })
        );
    }
}
