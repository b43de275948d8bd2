//! Generative model client
//!
//! Defines the generator trait and the REST implementation.

use async_trait::async_trait;

use super::types::{GenerateContentRequest, GenerateContentResponse};
use crate::config::GenerativeConfig;

/// Generative model errors
#[derive(Debug, thiserror::Error)]
pub enum GenAiError {
    #[error("Request to generative model failed: {0}")]
    Http(String),

    #[error("Generative model returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Prompt was blocked: {0}")]
    Blocked(String),

    #[error("Generative model returned no candidates")]
    EmptyResponse,

    #[error("Failed to parse generative model response: {0}")]
    InvalidResponse(String),
}

/// Text generation backend
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Model identifier requests are sent to
    fn model(&self) -> &str;

    /// Run one generation call and return the response text
    async fn generate(&self, request: &GenerateContentRequest) -> Result<String, GenAiError>;
}

/// `generateContent` over HTTPS with an API key
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &GenerativeConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    /// Same credentials, different model
    pub fn with_model(&self, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..self.clone()
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerateContentRequest) -> Result<String, GenAiError> {
        tracing::debug!(
            "Calling {} with {} text part(s)",
            self.model,
            request.texts().len()
        );

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(request)
            .send()
            .await
            .map_err(|e| GenAiError::Http(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenAiError::Http(e.without_url().to_string()))?;

        if !status.is_success() {
            return Err(GenAiError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&body).map_err(|e| GenAiError::InvalidResponse(e.to_string()))?;

        if let Some(text) = parsed.text() {
            return Ok(text);
        }
        match parsed.block_reason() {
            Some(reason) => Err(GenAiError::Blocked(reason.to_string())),
            None => Err(GenAiError::EmptyResponse),
        }
    }
}

/// Pull `error.message` out of an API error body, falling back to the raw body
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

/// Mock generator for testing
#[cfg(test)]
pub struct MockGenerator {
    pub response: Result<String, String>,
    pub requests: std::sync::Mutex<Vec<GenerateContentRequest>>,
}

#[cfg(test)]
impl MockGenerator {
    pub fn replying(text: &str) -> Self {
        Self {
            response: Ok(text.to_string()),
            requests: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            requests: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<GenerateContentRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[cfg(test)]
#[async_trait]
impl ContentGenerator for MockGenerator {
    fn model(&self) -> &str {
        "mock-model"
    }

    async fn generate(&self, request: &GenerateContentRequest) -> Result<String, GenAiError> {
        self.requests.lock().unwrap().push(request.clone());
        self.response.clone().map_err(|message| GenAiError::Api {
            status: 503,
            message,
        })
    }
}
