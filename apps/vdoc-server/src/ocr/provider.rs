//! OCR Providers
//!
//! Defines the detector trait and the cloud text-detection implementation.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use super::types::{OcrError, TextAnnotation};
use crate::config::{ConfigError, VisionOcrConfig};

/// Text detector trait
#[async_trait]
pub trait TextDetector: Send + Sync {
    /// Short name for logs
    fn provider_name(&self) -> &str;

    /// Detect text in the image stored at `path`
    async fn detect_text(&self, path: &Path) -> Result<Vec<TextAnnotation>, OcrError>;
}

/// Credentials for the cloud text-detection API
#[derive(Clone, Deserialize)]
pub struct VisionCredentials {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
}

impl std::fmt::Debug for VisionCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisionCredentials")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("project_id", &self.project_id)
            .finish()
    }
}

impl VisionCredentials {
    /// Read and validate a credentials file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Credentials {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let credentials: VisionCredentials =
            serde_json::from_str(&contents).map_err(|e| ConfigError::Credentials {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        if credentials.api_key.is_none() && credentials.access_token.is_none() {
            return Err(ConfigError::Credentials {
                path: path.to_path_buf(),
                reason: "expected an \"api_key\" or \"access_token\" entry".to_string(),
            });
        }
        Ok(credentials)
    }
}

/// Cloud Vision `images:annotate` provider
pub struct CloudVisionDetector {
    http: reqwest::Client,
    endpoint: String,
    credentials: VisionCredentials,
}

impl CloudVisionDetector {
    pub fn new(endpoint: &str, credentials: VisionCredentials) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    /// Build from configuration, loading credentials from disk
    pub fn from_config(config: &VisionOcrConfig) -> Result<Self, ConfigError> {
        let path = config.resolved_credentials_file();
        let credentials = VisionCredentials::from_file(&path)?;
        tracing::info!("Loaded OCR credentials from {}", path.display());
        Ok(Self::new(&config.endpoint, credentials))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    #[serde(default)]
    text_annotations: Vec<TextAnnotation>,
    #[serde(default)]
    error: Option<ApiStatus>,
}

#[derive(Deserialize)]
struct ApiStatus {
    #[serde(default)]
    message: String,
}

fn parse_annotations(body: &str) -> Result<Vec<TextAnnotation>, OcrError> {
    let parsed: AnnotateResponse =
        serde_json::from_str(body).map_err(|e| OcrError::InvalidResponse(e.to_string()))?;

    let Some(first) = parsed.responses.into_iter().next() else {
        return Ok(Vec::new());
    };
    if let Some(status) = first.error {
        return Err(OcrError::ApiError(status.message));
    }
    Ok(first.text_annotations)
}

#[async_trait]
impl TextDetector for CloudVisionDetector {
    fn provider_name(&self) -> &str {
        "cloud-vision"
    }

    async fn detect_text(&self, path: &Path) -> Result<Vec<TextAnnotation>, OcrError> {
        use base64::Engine;

        let image_data = tokio::fs::read(path).await?;
        let content = base64::engine::general_purpose::STANDARD.encode(&image_data);

        let request = serde_json::json!({
            "requests": [{
                "image": { "content": content },
                "features": [{ "type": "TEXT_DETECTION" }]
            }]
        });

        let mut builder = self
            .http
            .post(format!("{}/v1/images:annotate", self.endpoint))
            .json(&request);
        if let Some(token) = &self.credentials.access_token {
            builder = builder.bearer_auth(token);
        } else if let Some(key) = &self.credentials.api_key {
            builder = builder.query(&[("key", key.as_str())]);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| OcrError::Http(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| OcrError::Http(e.without_url().to_string()))?;

        if !status.is_success() {
            return Err(OcrError::ApiError(format!(
                "OCR service returned {}: {}",
                status,
                body.trim()
            )));
        }

        parse_annotations(&body)
    }
}

/// Mock detector for testing
#[cfg(test)]
pub struct MockDetector {
    pub response: Result<Vec<TextAnnotation>, String>,
    /// Whether the staged file existed when detection ran
    pub saw_file: std::sync::Mutex<Vec<bool>>,
}

#[cfg(test)]
impl MockDetector {
    pub fn with_text(text: &str) -> Self {
        Self {
            response: Ok(vec![TextAnnotation {
                description: text.to_string(),
                locale: None,
            }]),
            saw_file: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self {
            response: Ok(Vec::new()),
            saw_file: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            saw_file: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl TextDetector for MockDetector {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn detect_text(&self, path: &Path) -> Result<Vec<TextAnnotation>, OcrError> {
        self.saw_file.lock().unwrap().push(path.exists());
        self.response.clone().map_err(OcrError::ApiError)
    }
}
