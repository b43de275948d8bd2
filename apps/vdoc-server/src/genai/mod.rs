//! Generative Model Module
//!
//! Thin client for a hosted multimodal model. Both the ingredient detector
//! and the prompt composer talk to the model through [`ContentGenerator`], so
//! tests swap in a mock and each handler gets an explicitly constructed
//! client instead of a process-wide one.

mod client;
mod types;

pub use client::{ContentGenerator, GeminiClient, GenAiError};
pub use types::{
    Blob, Candidate, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    HarmBlockThreshold, HarmCategory, Part, SafetySetting,
};

#[cfg(test)]
pub use client::MockGenerator;
