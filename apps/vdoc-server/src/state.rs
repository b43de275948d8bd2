//! Application state management

use std::sync::Arc;

use crate::compose::PromptComposer;
use crate::config::{Config, ConfigError};
use crate::genai::GeminiClient;
use crate::ocr::{CloudVisionDetector, OcrGateway};
use crate::page::PageServices;
use crate::vision::IngredientDetector;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    max_upload_bytes: usize,
    services: PageServices,
}

impl AppState {
    /// State over already constructed gateways
    pub fn new(max_upload_bytes: usize, services: PageServices) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                max_upload_bytes,
                services,
            }),
        }
    }

    /// Build every client from configuration.
    ///
    /// Fails if the OCR credentials file cannot be read.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let generator = Arc::new(GeminiClient::new(&config.generative));
        let detector = CloudVisionDetector::from_config(&config.vision)?;

        let services = PageServices {
            ocr: OcrGateway::with_temp_dir(Arc::new(detector)),
            vision: IngredientDetector::new(generator.clone()),
            composer: PromptComposer::new(generator),
        };

        Ok(Self::new(config.server.max_upload_bytes, services))
    }

    /// Maximum accepted request body for uploads
    pub fn max_upload_bytes(&self) -> usize {
        self.inner.max_upload_bytes
    }

    pub fn services(&self) -> &PageServices {
        &self.inner.services
    }

    pub fn ocr(&self) -> &OcrGateway {
        &self.inner.services.ocr
    }

    pub fn vision(&self) -> &IngredientDetector {
        &self.inner.services.vision
    }

    pub fn composer(&self) -> &PromptComposer {
        &self.inner.services.composer
    }
}
