//! Server-side crop endpoint
//!
//! `POST /api/crop` takes multipart fields `file`, `unit` (`%` or `px`),
//! `x`, `y`, `width`, `height`, and optionally `displayedWidth` /
//! `displayedHeight` when a pixel region was measured on a scaled display.
//! Responds with the JPEG bytes.

use axum::{
    body::Body,
    extract::Multipart,
    http::{header, HeaderValue},
    response::Response,
};

use crate::crop::{CropRegion, CropUnit, CroppedImage, UploadedImage};
use crate::error::{AppError, Result};

/// Parsed multipart form
#[derive(Debug, Default)]
struct CropForm {
    file: Option<Vec<u8>>,
    unit: CropUnit,
    x: Option<f64>,
    y: Option<f64>,
    width: Option<f64>,
    height: Option<f64>,
    displayed_width: Option<u32>,
    displayed_height: Option<u32>,
}

impl CropForm {
    async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or("").to_string();

            if name == "file" {
                form.file = Some(field.bytes().await?.to_vec());
                continue;
            }

            let value = field.text().await?;
            match name.as_str() {
                "unit" => {
                    form.unit = CropUnit::parse(&value).ok_or_else(|| {
                        AppError::BadRequest(format!("Unknown crop unit: {}", value))
                    })?
                }
                "x" => form.x = Some(parse_number(&name, &value)?),
                "y" => form.y = Some(parse_number(&name, &value)?),
                "width" => form.width = Some(parse_number(&name, &value)?),
                "height" => form.height = Some(parse_number(&name, &value)?),
                "displayedWidth" => form.displayed_width = Some(parse_number(&name, &value)?),
                "displayedHeight" => form.displayed_height = Some(parse_number(&name, &value)?),
                _ => tracing::debug!("Ignoring crop field '{}'", name),
            }
        }

        Ok(form)
    }

    fn region(&self) -> Result<CropRegion> {
        let required = |value: Option<f64>, name: &str| {
            value.ok_or_else(|| AppError::BadRequest(format!("Missing field: {}", name)))
        };
        Ok(CropRegion {
            unit: self.unit,
            x: required(self.x, "x")?,
            y: required(self.y, "y")?,
            width: required(self.width, "width")?,
            height: required(self.height, "height")?,
        })
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid number for {}: {}", name, value)))
}

/// Crop an uploaded image and return it as JPEG
pub async fn crop(multipart: Multipart) -> Result<Response> {
    let form = CropForm::read(multipart).await?;
    let region = form.region()?;
    let displayed = form.displayed_width.zip(form.displayed_height);
    let bytes = form
        .file
        .ok_or_else(|| AppError::BadRequest("Missing field: file".to_string()))?;

    // Decoding and encoding are CPU-bound
    let cropped = tokio::task::spawn_blocking(move || -> Result<CroppedImage> {
        let source = UploadedImage::decode(&bytes)?;
        let region = match displayed {
            Some((w, h)) => {
                region.from_displayed(w, h, source.natural_width(), source.natural_height())
            }
            None => region,
        };
        Ok(crate::crop::crop_image(&source, &region)?)
    })
    .await??;

    tracing::info!(
        "Cropped image {} to {}x{} ({} bytes)",
        cropped.id,
        cropped.width,
        cropped.height,
        cropped.data.len()
    );

    let width = cropped.width.to_string();
    let height = cropped.height.to_string();
    let id = cropped.id.to_string();

    Response::builder()
        .header(header::CONTENT_TYPE, HeaderValue::from_static(CroppedImage::MIME_TYPE))
        .header(
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", CroppedImage::FILE_NAME),
        )
        .header("x-crop-width", width)
        .header("x-crop-height", height)
        .header("x-crop-id", id)
        .body(Body::from(cropped.data))
        .map_err(|e| AppError::Internal(e.to_string()))
}
