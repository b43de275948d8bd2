//! Prompt Composer Module
//!
//! Few-shot prompts for the drug, recipe and nutrition pages, the call to the
//! generative model, and safe rendering of what comes back.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vdoc_server::compose::{PromptComposer, SubjectKind};
//!
//! let composer = PromptComposer::new(generator);
//! if let Some(result) = composer.compose(SubjectKind::Drug.profile(), "Aspirin").await {
//!     println!("{}", result.html());
//! }
//! ```

mod composer;
mod profile;
mod prompt;
mod render;

pub use composer::{PromptComposer, RenderedResult};
pub use profile::{ExtractionMode, PageProfile, SubjectKind, SubjectPolicy};
pub use prompt::{combine_subject, PromptRequest};
pub use render::{render_markdown, sanitize_html, RenderError};
