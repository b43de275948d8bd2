//! Image Crop Module
//!
//! Turns a user-selected rectangle of an uploaded image into a new JPEG at
//! native resolution.
//!
//! Percent regions are relative to the natural image size
//! (`scale = natural / 100`); pixel regions are natural pixels. A pixel region
//! measured on a scaled display should go through
//! [`CropRegion::from_displayed`] first.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vdoc_server::crop::{crop_image, CropRegion, UploadedImage};
//!
//! let source = UploadedImage::decode(&bytes)?;
//! let cropped = crop_image(&source, &CropRegion::percent(25.0, 25.0, 50.0, 50.0))?;
//! assert_eq!(cropped.width, (source.natural_width() as f64 * 0.5).round() as u32);
//! ```

mod cropper;
mod types;

pub use cropper::{crop_bytes, crop_image, CroppedImage, UploadedImage, JPEG_QUALITY};
pub use types::{CropError, CropRegion, CropUnit, PixelRect, MAX_JPEG_DIMENSION};

#[cfg(test)]
pub(crate) use cropper::tests::png_fixture;
