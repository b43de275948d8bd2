//! Prompt composer
//!
//! Sends a page's few-shot prompt to the generative model and renders the
//! answer. Any failure becomes the page's fixed error message.

use std::sync::Arc;

use serde::Serialize;

use crate::genai::{ContentGenerator, GenerationConfig, SafetySetting};

use super::profile::PageProfile;
use super::prompt::{combine_subject, PromptRequest};
use super::render::render_markdown;

/// What the page displays after a submit
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RenderedResult {
    /// Sanitized HTML rendered from the model's markdown
    Answer { html: String },
    /// Fixed user-facing message; nothing from the failed call is shown
    Failure { message: String },
}

impl RenderedResult {
    /// Markup ready to insert into a page
    pub fn html(&self) -> String {
        match self {
            Self::Answer { html } => html.clone(),
            Self::Failure { message } => format!("<p>{}</p>", html_escape::encode_text(message)),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }
}

/// Builds prompts, calls the model, renders the answer
#[derive(Clone)]
pub struct PromptComposer {
    generator: Arc<dyn ContentGenerator>,
    generation: GenerationConfig,
    safety: Vec<SafetySetting>,
}

impl PromptComposer {
    /// Composer with the page defaults: temperature 1, top-p 1, 8192
    /// tokens, plain text, least restrictive safety thresholds
    pub fn new(generator: Arc<dyn ContentGenerator>) -> Self {
        Self {
            generator,
            generation: GenerationConfig::default(),
            safety: SafetySetting::relaxed(),
        }
    }

    pub fn with_safety_settings(mut self, safety: Vec<SafetySetting>) -> Self {
        self.safety = safety;
        self
    }

    pub fn with_generation_config(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    /// Compose an answer for `subject`.
    ///
    /// Returns `None` without calling the model when the subject is blank.
    pub async fn compose(&self, profile: &PageProfile, subject: &str) -> Option<RenderedResult> {
        let prompt = PromptRequest::build(profile, subject)?;
        Some(self.run(profile, &prompt).await)
    }

    /// Merge typed input with extracted text per the page's policy, then compose
    pub async fn compose_from_inputs(
        &self,
        profile: &PageProfile,
        input: &str,
        extracted: &str,
    ) -> Option<RenderedResult> {
        let subject = combine_subject(profile.subject_policy, input, extracted);
        self.compose(profile, &subject).await
    }

    async fn run(&self, profile: &PageProfile, prompt: &PromptRequest) -> RenderedResult {
        let request = prompt.to_request(&self.generation, &self.safety);

        tracing::info!(
            "Composing {} answer for '{}' with {}",
            profile.kind.as_str(),
            prompt.subject(),
            self.generator.model()
        );

        let markdown = match self.generator.generate(&request).await {
            Ok(markdown) => markdown,
            Err(e) => {
                tracing::error!("Generation failed for {} page: {}", profile.kind.as_str(), e);
                return RenderedResult::Failure {
                    message: profile.error_message.to_string(),
                };
            }
        };

        match render_markdown(&markdown) {
            Ok(html) => RenderedResult::Answer { html },
            Err(e) => {
                tracing::error!("Failed to render model output: {}", e);
                RenderedResult::Failure {
                    message: profile.error_message.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::SubjectKind;
    use crate::genai::{HarmBlockThreshold, MockGenerator};

    #[tokio::test]
    async fn test_blank_subject_makes_no_call() {
        let mock = Arc::new(MockGenerator::replying("unused"));
        let composer = PromptComposer::new(mock.clone());

        let result = composer.compose(SubjectKind::Drug.profile(), "   ").await;

        assert!(result.is_none());
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_markdown_answer_is_rendered() {
        let mock = Arc::new(MockGenerator::replying("**bold**"));
        let composer = PromptComposer::new(mock.clone());

        let result = composer
            .compose(SubjectKind::Drug.profile(), "Aspirin")
            .await
            .unwrap();

        assert!(result.html().contains("<strong>bold</strong>"));
        assert!(!result.is_failure());
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_uses_fixed_message() {
        let composer = PromptComposer::new(Arc::new(MockGenerator::failing("internal details")));

        let result = composer
            .compose(SubjectKind::Recipe.profile(), "eggs")
            .await
            .unwrap();

        assert_eq!(
            result,
            RenderedResult::Failure {
                message: "An error occurred while fetching the food information.".to_string()
            }
        );
        assert!(!result.html().contains("internal details"));
    }

    #[tokio::test]
    async fn test_request_parameters() {
        let mock = Arc::new(MockGenerator::replying("ok"));
        let composer = PromptComposer::new(mock.clone());

        composer
            .compose(SubjectKind::Nutrition.profile(), "apple")
            .await
            .unwrap();

        let request = mock.last_request().unwrap();
        let texts = request.texts();
        assert_eq!(texts.len(), 4);
        assert!(texts[2].contains("apple"));
        assert_eq!(texts[3], "Nutrition information: ");
        assert!(request
            .safety_settings
            .iter()
            .all(|s| s.threshold == HarmBlockThreshold::BlockNone));
        assert_eq!(request.generation_config.unwrap().max_output_tokens, Some(8192));
    }

    #[tokio::test]
    async fn test_custom_safety_thresholds() {
        let mock = Arc::new(MockGenerator::replying("ok"));
        let composer = PromptComposer::new(mock.clone())
            .with_safety_settings(SafetySetting::uniform(HarmBlockThreshold::BlockOnlyHigh));

        composer.compose(SubjectKind::Drug.profile(), "Aspirin").await;

        let request = mock.last_request().unwrap();
        assert!(request
            .safety_settings
            .iter()
            .all(|s| s.threshold == HarmBlockThreshold::BlockOnlyHigh));
    }

    #[tokio::test]
    async fn test_compose_from_inputs_joins_subject() {
        let mock = Arc::new(MockGenerator::replying("ok"));
        let composer = PromptComposer::new(mock.clone());

        composer
            .compose_from_inputs(SubjectKind::Recipe.profile(), "eggs", "milk, flour")
            .await
            .unwrap();

        let request = mock.last_request().unwrap();
        assert!(request.texts()[2].starts_with("Ingredients: eggs, milk, flour"));
    }

    #[test]
    fn test_failure_html_is_escaped() {
        let result = RenderedResult::Failure {
            message: "<b>nope</b>".to_string(),
        };
        assert_eq!(result.html(), "<p>&lt;b&gt;nope&lt;/b&gt;</p>");
    }
}
