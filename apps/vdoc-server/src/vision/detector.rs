//! Ingredient detection via a vision model

use std::sync::Arc;

use crate::genai::{ContentGenerator, GenAiError, GenerateContentRequest, Part};

/// Instruction sent alongside every image
pub const INGREDIENT_INSTRUCTION: &str = "Give names of all ingredients present in the image separated by commas. \
Give only the ingredients names, do not give any intro text like [The ingredients in the image are..]. \
I need just the ingredient names alone separated by commas.";

/// MIME type declared to the model for every image
const DECLARED_MIME_TYPE: &str = "image/jpeg";

/// Vision gateway errors
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("Image is not a data URL: missing ',' separator")]
    MalformedDataUrl,

    #[error("Image payload is empty")]
    EmptyPayload,

    #[error(transparent)]
    Model(#[from] GenAiError),
}

/// Strip the `data:<mime>;base64,` prefix and return the payload.
///
/// Everything after the first comma is the payload. A string with no comma
/// is rejected rather than passed through as-is.
pub fn split_data_url(data_url: &str) -> Result<&str, VisionError> {
    data_url
        .split_once(',')
        .map(|(_, payload)| payload)
        .ok_or(VisionError::MalformedDataUrl)
}

/// Asks a vision model which ingredients an image shows
#[derive(Clone)]
pub struct IngredientDetector {
    model: Arc<dyn ContentGenerator>,
}

impl IngredientDetector {
    pub fn new(model: Arc<dyn ContentGenerator>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.model()
    }

    /// Detect ingredient names in a data-URL encoded image.
    ///
    /// Returns the model's raw text unmodified.
    pub async fn detect(&self, data_url: &str) -> Result<String, VisionError> {
        let payload = split_data_url(data_url)?;
        if payload.trim().is_empty() {
            return Err(VisionError::EmptyPayload);
        }

        let request = GenerateContentRequest::user(vec![
            Part::inline(DECLARED_MIME_TYPE, payload),
            Part::text(INGREDIENT_INSTRUCTION),
        ]);

        tracing::debug!(
            "Detecting ingredients with {} ({} base64 chars)",
            self.model.model(),
            payload.len()
        );

        let text = self.model.generate(&request).await?;
        Ok(text)
    }
}
