//! OCR Module
//!
//! Provides text extraction for uploaded images (drug labels, food packaging).
//!
//! The cloud detector reads the image from a staged file, so every request
//! goes through a [`ScratchStore`]. The staged file is removed once per
//! request whether detection succeeds or fails.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vdoc_server::ocr::{CloudVisionDetector, OcrGateway};
//!
//! let detector = CloudVisionDetector::from_config(&config.vision)?;
//! let gateway = OcrGateway::with_temp_dir(Arc::new(detector));
//!
//! let text = gateway.extract_text("label.jpg", &bytes).await?;
//! ```

mod provider;
mod scratch;
mod service;
mod types;

pub use provider::{CloudVisionDetector, TextDetector, VisionCredentials};
pub use scratch::{staging_name, ScratchStore, TempDirStore};
pub use service::OcrGateway;
pub use types::{ExtractTextResponse, OcrError, TextAnnotation};

#[cfg(test)]
pub use provider::MockDetector;
#[cfg(test)]
pub use scratch::CountingStore;
