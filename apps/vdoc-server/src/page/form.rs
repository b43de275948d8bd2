//! Form page state
//!
//! One parameterized page replaces the drug, recipe and nutrition variants.
//! The state mirrors what the browser holds: the current upload, the crop
//! rectangle, the cropped blob, extracted text and the rendered answer.

use crate::compose::{ExtractionMode, PageProfile, PromptComposer, RenderedResult, SubjectKind};
use crate::crop::{crop_image, CropError, CropRegion, CroppedImage, UploadedImage};
use crate::ocr::OcrGateway;
use crate::vision::IngredientDetector;

/// Shown when OCR succeeds but finds no text
pub const NO_TEXT_EXTRACTED: &str = "No text extracted";

/// Page errors that leave the state untouched
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("No image has been uploaded")]
    NoImage,

    #[error("No cropped image to extract from")]
    NoCrop,

    #[error(transparent)]
    Crop(#[from] CropError),
}

/// Outcome of the last extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Text(String),
    Empty,
    Failed,
}

impl Extraction {
    /// Text usable as part of the subject
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Empty | Self::Failed => "",
        }
    }

    /// What the extracted-text field shows
    pub fn display<'a>(&'a self, profile: &'static PageProfile) -> &'a str {
        match self {
            Self::Text(text) => text,
            Self::Empty => NO_TEXT_EXTRACTED,
            Self::Failed => profile.extraction_failed,
        }
    }
}

/// Gateways a page talks to, constructed once and handed in
#[derive(Clone)]
pub struct PageServices {
    pub ocr: OcrGateway,
    pub vision: IngredientDetector,
    pub composer: PromptComposer,
}

/// State of one form page
#[derive(Debug)]
pub struct FormPage {
    profile: &'static PageProfile,
    input: String,
    uploaded: Option<UploadedImage>,
    crop: Option<CropRegion>,
    cropped: Option<CroppedImage>,
    extraction: Option<Extraction>,
    result: Option<RenderedResult>,
}

impl FormPage {
    pub fn new(kind: SubjectKind) -> Self {
        Self {
            profile: kind.profile(),
            input: String::new(),
            uploaded: None,
            crop: None,
            cropped: None,
            extraction: None,
            result: None,
        }
    }

    pub fn profile(&self) -> &'static PageProfile {
        self.profile
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replace the current upload.
    ///
    /// Any crop and extraction belonging to the previous image is discarded.
    pub fn upload_image(&mut self, bytes: &[u8]) -> Result<(), PageError> {
        let image = UploadedImage::decode(bytes)?;
        tracing::debug!(
            "Uploaded {}x{} image on {} page",
            image.natural_width(),
            image.natural_height(),
            self.profile.kind.as_str()
        );
        self.uploaded = Some(image);
        self.crop = None;
        self.cropped = None;
        self.extraction = None;
        Ok(())
    }

    pub fn uploaded(&self) -> Option<&UploadedImage> {
        self.uploaded.as_ref()
    }

    /// Track the rectangle while the user drags
    pub fn set_crop(&mut self, region: CropRegion) {
        self.crop = Some(region);
    }

    pub fn crop(&self) -> Option<&CropRegion> {
        self.crop.as_ref()
    }

    /// Rasterize the current upload through `region`.
    ///
    /// The new blob supersedes the previous one. On failure the previous
    /// blob is kept.
    pub fn complete_crop(&mut self, region: CropRegion) -> Result<&CroppedImage, PageError> {
        let source = self.uploaded.as_ref().ok_or(PageError::NoImage)?;
        let cropped = crop_image(source, &region)?;

        if let Some(previous) = &self.cropped {
            tracing::debug!("Crop {} supersedes {}", cropped.id, previous.id);
        }

        self.crop = Some(region);
        Ok(&*self.cropped.insert(cropped))
    }

    pub fn cropped(&self) -> Option<&CroppedImage> {
        self.cropped.as_ref()
    }

    /// Read text out of the cropped image with the page's gateway.
    ///
    /// Gateway failures are not errors here: they become the page's fixed
    /// failure text, as the field would show it.
    pub async fn extract(&mut self, services: &PageServices) -> Result<&Extraction, PageError> {
        let cropped = self.cropped.as_ref().ok_or(PageError::NoCrop)?;

        let extraction = match self.profile.extraction {
            ExtractionMode::Ocr => {
                match services
                    .ocr
                    .extract_text(CroppedImage::FILE_NAME, &cropped.data)
                    .await
                {
                    Ok(text) if text.trim().is_empty() => Extraction::Empty,
                    Ok(text) => Extraction::Text(text),
                    Err(e) => {
                        tracing::error!("Error extracting text: {}", e);
                        Extraction::Failed
                    }
                }
            }
            ExtractionMode::Vision => match services.vision.detect(&cropped.to_data_url()).await {
                Ok(text) if text.trim().is_empty() => Extraction::Empty,
                Ok(text) => Extraction::Text(text.trim().to_string()),
                Err(e) => {
                    tracing::error!("Error detecting ingredients: {}", e);
                    Extraction::Failed
                }
            },
        };

        Ok(&*self.extraction.insert(extraction))
    }

    /// Set extracted text directly, e.g. when the client did the extraction
    pub fn set_extracted_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.extraction = Some(if text.trim().is_empty() {
            Extraction::Empty
        } else {
            Extraction::Text(text)
        });
    }

    pub fn extraction(&self) -> Option<&Extraction> {
        self.extraction.as_ref()
    }

    /// Contents of the extracted-text field
    pub fn extracted_display(&self) -> &str {
        self.extraction
            .as_ref()
            .map(|e| e.display(self.profile))
            .unwrap_or("")
    }

    /// Combine input and extracted text and ask the model.
    ///
    /// With an empty subject nothing is sent and the result is unchanged.
    pub async fn submit(&mut self, composer: &PromptComposer) -> Option<&RenderedResult> {
        let extracted = self.extraction.as_ref().map(Extraction::text).unwrap_or("");
        let result = composer
            .compose_from_inputs(self.profile, &self.input, extracted)
            .await?;
        Some(&*self.result.insert(result))
    }

    pub fn result(&self) -> Option<&RenderedResult> {
        self.result.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::render_markdown;
    use crate::crop::{png_fixture, CropRegion};
    use crate::genai::MockGenerator;
    use crate::ocr::{CountingStore, MockDetector};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn services(
        detector: MockDetector,
        vision: MockGenerator,
        composer: MockGenerator,
        dir: &TempDir,
    ) -> (PageServices, Arc<CountingStore>) {
        let store = Arc::new(CountingStore::new(dir.path().to_path_buf()));
        let services = PageServices {
            ocr: OcrGateway::new(Arc::new(detector), store.clone()),
            vision: IngredientDetector::new(Arc::new(vision)),
            composer: PromptComposer::new(Arc::new(composer)),
        };
        (services, store)
    }

    #[tokio::test]
    async fn test_aspirin_end_to_end() {
        let answer = "**Drug Name:** Aspirin\n\n* **Warfarin:** Increases bleeding risk";
        let mock = Arc::new(MockGenerator::replying(answer));
        let composer = PromptComposer::new(mock.clone());

        let mut page = FormPage::new(SubjectKind::Drug);
        page.set_input("Aspirin");
        let result = page.submit(&composer).await.unwrap().clone();

        assert_eq!(
            result,
            RenderedResult::Answer {
                html: render_markdown(answer).unwrap()
            }
        );
        assert_eq!(page.result(), Some(&result));
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_crop_then_ocr_shows_text() {
        let temp_dir = TempDir::new().unwrap();
        let (services, store) = services(
            MockDetector::with_text("Tylenol"),
            MockGenerator::replying("unused"),
            MockGenerator::replying("unused"),
            &temp_dir,
        );

        let mut page = FormPage::new(SubjectKind::Drug);
        page.upload_image(&png_fixture(200, 120)).unwrap();
        let cropped = page
            .complete_crop(CropRegion::percent(25.0, 25.0, 50.0, 50.0))
            .unwrap();
        assert_eq!((cropped.width, cropped.height), (100, 60));

        let extraction = page.extract(&services).await.unwrap();
        assert_eq!(extraction, &Extraction::Text("Tylenol".to_string()));
        assert_eq!(page.extracted_display(), "Tylenol");
        assert_eq!(store.removed_count(), 1);
    }

    #[tokio::test]
    async fn test_extracted_text_becomes_subject() {
        let temp_dir = TempDir::new().unwrap();
        let composer = Arc::new(MockGenerator::replying("ok"));
        let (mut services, _) = services(
            MockDetector::with_text("Tylenol"),
            MockGenerator::replying("unused"),
            MockGenerator::replying("unused"),
            &temp_dir,
        );
        services.composer = PromptComposer::new(composer.clone());

        let mut page = FormPage::new(SubjectKind::Drug);
        page.upload_image(&png_fixture(50, 50)).unwrap();
        page.complete_crop(CropRegion::percent(0.0, 0.0, 100.0, 100.0))
            .unwrap();
        page.extract(&services).await.unwrap();
        page.submit(&services.composer).await.unwrap();

        let request = composer.last_request().unwrap();
        assert!(request.texts()[2].starts_with("Drug name: Tylenol"));
    }

    #[tokio::test]
    async fn test_empty_and_failed_ocr_display() {
        let temp_dir = TempDir::new().unwrap();
        let (ok_services, _) = services(
            MockDetector::empty(),
            MockGenerator::replying("unused"),
            MockGenerator::replying("unused"),
            &temp_dir,
        );
        let mut page = FormPage::new(SubjectKind::Nutrition);
        page.upload_image(&png_fixture(40, 40)).unwrap();
        page.complete_crop(CropRegion::percent(0.0, 0.0, 50.0, 50.0))
            .unwrap();
        page.extract(&ok_services).await.unwrap();
        assert_eq!(page.extracted_display(), NO_TEXT_EXTRACTED);

        let (failing, store) = services(
            MockDetector::failing("quota"),
            MockGenerator::replying("unused"),
            MockGenerator::replying("unused"),
            &temp_dir,
        );
        page.extract(&failing).await.unwrap();
        assert_eq!(page.extracted_display(), "Failed to extract text from image");
        assert_eq!(page.extraction().unwrap().text(), "");
        assert_eq!(store.removed_count(), 1);
    }

    #[tokio::test]
    async fn test_recipe_uses_vision_and_joins_input() {
        let temp_dir = TempDir::new().unwrap();
        let vision = Arc::new(MockGenerator::replying(" milk, flour \n"));
        let composer = Arc::new(MockGenerator::replying("## Pancakes"));
        let (mut services, store) = services(
            MockDetector::with_text("unused"),
            MockGenerator::replying("unused"),
            MockGenerator::replying("unused"),
            &temp_dir,
        );
        services.vision = IngredientDetector::new(vision.clone());
        services.composer = PromptComposer::new(composer.clone());

        let mut page = FormPage::new(SubjectKind::Recipe);
        page.set_input("eggs");
        page.upload_image(&png_fixture(64, 64)).unwrap();
        page.complete_crop(CropRegion::pixels(0.0, 0.0, 32.0, 32.0))
            .unwrap();

        let extraction = page.extract(&services).await.unwrap();
        assert_eq!(extraction.text(), "milk, flour");
        assert_eq!(vision.calls(), 1);
        assert_eq!(store.persisted_count(), 0);

        let result = page.submit(&services.composer).await.unwrap();
        assert!(result.html().contains("<h2>Pancakes</h2>"));
        let request = composer.last_request().unwrap();
        assert!(request.texts()[2].starts_with("Ingredients: eggs, milk, flour"));
    }

    #[tokio::test]
    async fn test_empty_subject_leaves_result_unset() {
        let mock = Arc::new(MockGenerator::replying("unused"));
        let composer = PromptComposer::new(mock.clone());

        let mut page = FormPage::new(SubjectKind::Nutrition);
        page.set_input("   ");

        assert!(page.submit(&composer).await.is_none());
        assert!(page.result().is_none());
        assert_eq!(mock.calls(), 0);
    }

    #[test]
    fn test_new_crop_supersedes_previous() {
        let mut page = FormPage::new(SubjectKind::Drug);
        page.upload_image(&png_fixture(100, 100)).unwrap();

        let first = page
            .complete_crop(CropRegion::percent(0.0, 0.0, 50.0, 50.0))
            .unwrap()
            .id;
        let second = page
            .complete_crop(CropRegion::percent(10.0, 10.0, 20.0, 20.0))
            .unwrap()
            .id;

        assert_ne!(first, second);
        assert_eq!(page.cropped().unwrap().id, second);
        assert_eq!(page.cropped().unwrap().width, 20);
    }

    #[test]
    fn test_failed_crop_keeps_previous_blob() {
        let mut page = FormPage::new(SubjectKind::Drug);
        page.upload_image(&png_fixture(100, 100)).unwrap();
        let first = page
            .complete_crop(CropRegion::percent(0.0, 0.0, 50.0, 50.0))
            .unwrap()
            .id;

        let result = page.complete_crop(CropRegion::percent(0.0, 0.0, 0.0, 50.0));

        assert!(matches!(result, Err(PageError::Crop(CropError::InvalidRegion(_)))));
        assert_eq!(page.cropped().unwrap().id, first);
    }

    #[test]
    fn test_upload_resets_derived_state() {
        let mut page = FormPage::new(SubjectKind::Drug);
        page.upload_image(&png_fixture(30, 30)).unwrap();
        page.complete_crop(CropRegion::percent(0.0, 0.0, 50.0, 50.0))
            .unwrap();
        page.set_extracted_text("Tylenol");

        page.upload_image(&png_fixture(60, 40)).unwrap();

        assert!(page.crop().is_none());
        assert!(page.cropped().is_none());
        assert!(page.extraction().is_none());
        assert_eq!(page.uploaded().unwrap().natural_width(), 60);
    }

    #[tokio::test]
    async fn test_missing_image_or_crop() {
        let temp_dir = TempDir::new().unwrap();
        let (services, _) = services(
            MockDetector::with_text("unused"),
            MockGenerator::replying("unused"),
            MockGenerator::replying("unused"),
            &temp_dir,
        );
        let mut page = FormPage::new(SubjectKind::Drug);

        assert!(matches!(
            page.complete_crop(CropRegion::percent(0.0, 0.0, 10.0, 10.0)),
            Err(PageError::NoImage)
        ));
        assert!(matches!(page.extract(&services).await, Err(PageError::NoCrop)));
        assert!(matches!(
            page.upload_image(b"nope"),
            Err(PageError::Crop(CropError::DecodeError(_)))
        ));
    }
}
