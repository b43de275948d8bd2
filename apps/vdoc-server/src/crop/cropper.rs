//! Image Cropper
//!
//! Rasterizes a crop region of an uploaded image onto a fresh surface at
//! native resolution and re-encodes it as JPEG.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbImage};
use uuid::Uuid;

use super::types::{CropError, CropRegion};

/// JPEG quality used for cropped output
pub const JPEG_QUALITY: u8 = 92;

/// A decoded upload, kept until the next upload replaces it
#[derive(Debug, Clone)]
pub struct UploadedImage {
    image: DynamicImage,
    natural_width: u32,
    natural_height: u32,
}

impl UploadedImage {
    /// Decode raw image bytes (any format the `image` crate can guess)
    pub fn decode(bytes: &[u8]) -> Result<Self, CropError> {
        let image =
            image::load_from_memory(bytes).map_err(|e| CropError::DecodeError(e.to_string()))?;
        Ok(Self::from_image(image))
    }

    /// Decode an image given as a base64 data URL
    pub fn from_data_url(data_url: &str) -> Result<Self, CropError> {
        let payload = crate::vision::split_data_url(data_url)
            .map_err(|e| CropError::DecodeError(e.to_string()))?;
        let bytes = BASE64
            .decode(payload.trim())
            .map_err(|e| CropError::DecodeError(format!("Invalid base64 payload: {}", e)))?;
        Self::decode(&bytes)
    }

    pub fn from_image(image: DynamicImage) -> Self {
        let (natural_width, natural_height) = (image.width(), image.height());
        Self {
            image,
            natural_width,
            natural_height,
        }
    }

    pub fn natural_width(&self) -> u32 {
        self.natural_width
    }

    pub fn natural_height(&self) -> u32 {
        self.natural_height
    }
}

/// JPEG produced from an uploaded image and a crop region
#[derive(Debug, Clone)]
pub struct CroppedImage {
    /// Identity of this blob; a new crop always gets a new id
    pub id: Uuid,
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl CroppedImage {
    pub const MIME_TYPE: &'static str = "image/jpeg";
    pub const FILE_NAME: &'static str = "cropped-image.jpg";

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", Self::MIME_TYPE, BASE64.encode(&self.data))
    }
}

/// Crop `source` to `region` and encode the result as JPEG.
///
/// The output is exactly `round(width*scaleX) x round(height*scaleY)` pixels.
/// Parts of the region outside the source are left black. Regions larger
/// than the source are rejected.
pub fn crop_image(source: &UploadedImage, region: &CropRegion) -> Result<CroppedImage, CropError> {
    let rect = region.to_pixels(source.natural_width, source.natural_height)?;

    let mut surface = RgbImage::new(rect.width, rect.height);
    if let Some(visible) = rect.intersect(source.natural_width, source.natural_height) {
        let patch = source
            .image
            .crop_imm(visible.x, visible.y, visible.width, visible.height)
            .to_rgb8();
        image::imageops::replace(&mut surface, &patch, 0, 0);
    }

    let mut data = Vec::new();
    JpegEncoder::new_with_quality(&mut data, JPEG_QUALITY)
        .encode_image(&surface)
        .map_err(|e| CropError::EncodeError(e.to_string()))?;

    if data.is_empty() {
        return Err(CropError::EncodeError("Encoder produced no data".to_string()));
    }

    tracing::debug!(
        "Cropped {}x{} image to {}x{} at ({}, {}), {} bytes",
        source.natural_width,
        source.natural_height,
        rect.width,
        rect.height,
        rect.x,
        rect.y,
        data.len()
    );

    Ok(CroppedImage {
        id: Uuid::new_v4(),
        data,
        width: rect.width,
        height: rect.height,
    })
}

/// Decode `bytes` and crop in one step
pub fn crop_bytes(bytes: &[u8], region: &CropRegion) -> Result<CroppedImage, CropError> {
    let source = UploadedImage::decode(bytes)?;
    crop_image(&source, region)
}
