//! Crop Types
//!
//! Crop rectangles as produced by a drag-to-select widget, and their
//! conversion to native pixel coordinates.

use serde::{Deserialize, Serialize};

/// Largest width or height a JPEG can carry
pub const MAX_JPEG_DIMENSION: u32 = 65_535;

/// Coordinate unit of a crop rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CropUnit {
    /// Percent of the natural image size (0-100)
    #[serde(rename = "%")]
    #[default]
    Percent,
    /// Natural image pixels
    #[serde(rename = "px")]
    Pixel,
}

impl CropUnit {
    /// Parse the unit as sent by a form field
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "%" | "percent" | "pct" => Some(Self::Percent),
            "px" | "pixel" | "pixels" => Some(Self::Pixel),
            _ => None,
        }
    }
}

/// Region of interest within an uploaded image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRegion {
    #[serde(default)]
    pub unit: CropUnit,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRegion {
    pub fn percent(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            unit: CropUnit::Percent,
            x,
            y,
            width,
            height,
        }
    }

    pub fn pixels(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            unit: CropUnit::Pixel,
            x,
            y,
            width,
            height,
        }
    }

    /// Re-express a pixel region measured on a scaled-down display of the
    /// image in natural pixels. Percent regions are returned unchanged.
    pub fn from_displayed(
        self,
        displayed_width: u32,
        displayed_height: u32,
        natural_width: u32,
        natural_height: u32,
    ) -> Self {
        if self.unit == CropUnit::Percent || displayed_width == 0 || displayed_height == 0 {
            return self;
        }
        let sx = natural_width as f64 / displayed_width as f64;
        let sy = natural_height as f64 / displayed_height as f64;
        Self::pixels(self.x * sx, self.y * sy, self.width * sx, self.height * sy)
    }

    /// Scale factors from region units to natural pixels
    pub fn scale(&self, natural_width: u32, natural_height: u32) -> (f64, f64) {
        match self.unit {
            CropUnit::Percent => (natural_width as f64 / 100.0, natural_height as f64 / 100.0),
            CropUnit::Pixel => (1.0, 1.0),
        }
    }

    /// Convert to native pixel coordinates given image dimensions
    pub fn to_pixels(
        &self,
        natural_width: u32,
        natural_height: u32,
    ) -> Result<PixelRect, CropError> {
        let values = [self.x, self.y, self.width, self.height];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(CropError::InvalidRegion(
                "Region coordinates must be finite numbers".to_string(),
            ));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(CropError::InvalidRegion(format!(
                "Region size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.x < 0.0 || self.y < 0.0 {
            return Err(CropError::InvalidRegion(format!(
                "Region origin must not be negative, got ({}, {})",
                self.x, self.y
            )));
        }

        let (sx, sy) = self.scale(natural_width, natural_height);
        let rect = PixelRect {
            x: (self.x * sx).round() as u32,
            y: (self.y * sy).round() as u32,
            width: (self.width * sx).round() as u32,
            height: (self.height * sy).round() as u32,
        };

        if rect.width == 0 || rect.height == 0 {
            return Err(CropError::InvalidRegion(format!(
                "Region scales to an empty {}x{} pixel area",
                rect.width, rect.height
            )));
        }
        // May run past the edges, never larger than the image
        let max_width = natural_width.min(MAX_JPEG_DIMENSION);
        let max_height = natural_height.min(MAX_JPEG_DIMENSION);
        if rect.width > max_width || rect.height > max_height {
            return Err(CropError::InvalidRegion(format!(
                "Region {}x{} is larger than the {}x{} image",
                rect.width, rect.height, natural_width, natural_height
            )));
        }

        Ok(rect)
    }
}

/// Pixel-based rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Part of this rectangle that lies inside a `width`x`height` image
    pub fn intersect(&self, width: u32, height: u32) -> Option<PixelRect> {
        let x1 = self.x.saturating_add(self.width).min(width);
        let y1 = self.y.saturating_add(self.height).min(height);
        if self.x >= x1 || self.y >= y1 {
            return None;
        }
        Some(PixelRect {
            x: self.x,
            y: self.y,
            width: x1 - self.x,
            height: y1 - self.y,
        })
    }
}

/// Crop error types
#[derive(Debug, thiserror::Error)]
pub enum CropError {
    #[error("Failed to decode source image: {0}")]
    DecodeError(String),

    #[error("Failed to encode cropped image: {0}")]
    EncodeError(String),

    #[error("Invalid crop region: {0}")]
    InvalidRegion(String),
}

impl CropError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Self::DecodeError(_) | Self::InvalidRegion(_) => StatusCode::BAD_REQUEST,
            Self::EncodeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
