//! OCR Service
//!
//! Stages an uploaded image on disk, runs text detection on it, and always
//! removes the staged file afterwards.

use std::sync::Arc;

use super::{
    provider::TextDetector,
    scratch::{staging_name, ScratchStore, TempDirStore},
    types::OcrError,
};

/// Text extraction over a detector and a scratch store
#[derive(Clone)]
pub struct OcrGateway {
    detector: Arc<dyn TextDetector>,
    scratch: Arc<dyn ScratchStore>,
}

impl OcrGateway {
    pub fn new(detector: Arc<dyn TextDetector>, scratch: Arc<dyn ScratchStore>) -> Self {
        Self { detector, scratch }
    }

    /// Gateway staging uploads in the OS temp directory
    pub fn with_temp_dir(detector: Arc<dyn TextDetector>) -> Self {
        Self::new(detector, Arc::new(TempDirStore::default()))
    }

    /// Extract the full-image text from an uploaded file.
    ///
    /// Returns an empty string when nothing was detected. Single attempt,
    /// no retry.
    pub async fn extract_text(&self, file_name: &str, data: &[u8]) -> Result<String, OcrError> {
        let path = self.scratch.persist(&staging_name(file_name), data).await?;

        tracing::debug!(
            "Running {} text detection on {} ({} bytes)",
            self.detector.provider_name(),
            path.display(),
            data.len()
        );

        let detected = self.detector.detect_text(&path).await;

        if let Err(e) = self.scratch.remove(&path).await {
            tracing::warn!("Failed to remove staged upload {}: {}", path.display(), e);
        }

        let annotations = detected?;
        Ok(annotations
            .into_iter()
            .next()
            .map(|a| a.description)
            .unwrap_or_default())
    }
}
