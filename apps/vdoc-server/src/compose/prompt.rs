//! Few-shot prompt construction

use crate::genai::{GenerateContentRequest, GenerationConfig, Part, SafetySetting};

use super::profile::{PageProfile, SubjectPolicy};

/// Merge typed input and extracted text into one subject string
pub fn combine_subject(policy: SubjectPolicy, input: &str, extracted: &str) -> String {
    let input = input.trim();
    let extracted = extracted.trim();
    match policy {
        SubjectPolicy::PreferInput if !input.is_empty() => input.to_string(),
        SubjectPolicy::PreferInput => extracted.to_string(),
        SubjectPolicy::JoinAll => [input, extracted]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// Ordered prompt segments: example question, example answer, the real
/// task, continuation cue
#[derive(Debug, Clone, PartialEq)]
pub struct PromptRequest {
    subject: String,
    segments: Vec<String>,
}

impl PromptRequest {
    /// Build the prompt for `subject`; `None` if the subject is blank
    pub fn build(profile: &PageProfile, subject: &str) -> Option<Self> {
        let subject = subject.trim();
        if subject.is_empty() {
            return None;
        }

        let segments = vec![
            profile.example_question.to_string(),
            format!("{}{}", profile.continuation_cue, profile.example_answer),
            profile.instructions(subject),
            profile.continuation_cue.to_string(),
        ];

        Some(Self {
            subject: subject.to_string(),
            segments,
        })
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Wire request carrying every segment as its own text part
    pub fn to_request(
        &self,
        generation: &GenerationConfig,
        safety: &[SafetySetting],
    ) -> GenerateContentRequest {
        GenerateContentRequest::user(self.segments.iter().map(Part::text).collect())
            .with_safety_settings(safety.to_vec())
            .with_generation_config(generation.clone())
    }
}
