//! Image decoding, resizing and encoded output.
//!
//! Output stays in the source container: JPEG sources are re-encoded at a
//! fixed quality, every other format at its encoder defaults (no quality
//! knob, so lossless sources blow the byte budget more readily — a
//! deliberate tradeoff). The budget is enforced on the encoded bytes and an
//! over-budget image is rejected outright rather than re-encoded at lower
//! quality.

use crate::imaging::calculations;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat, RgbImage};
use std::io::Cursor;
use thiserror::Error;

/// Output JPEG quality, out of 100.
pub const JPEG_QUALITY: u8 = 80;

#[derive(Error, Debug)]
pub enum ImagingError {
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),
    #[error("encoded size {actual} bytes exceeds the {limit} byte budget")]
    OverBudget { actual: u64, limit: u64 },
}

/// Decode an image from its raw file bytes.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, ImagingError> {
    image::load_from_memory(bytes).map_err(ImagingError::Decode)
}

/// Detect the container format from the raw file bytes.
pub fn detect_format(bytes: &[u8]) -> Result<ImageFormat, ImagingError> {
    image::guess_format(bytes).map_err(ImagingError::Decode)
}

/// Resize to fit the target box, preserving aspect ratio, and flatten to RGB.
///
/// Lanczos3 keeps fine detail at the large downscale factors typical of
/// camera originals. Alpha is dropped here because the output is JPEG.
pub fn resize_to_fit(image: &DynamicImage, target: (u32, u32)) -> RgbImage {
    let (w, h) = calculations::fit_dimensions(image.dimensions(), target);
    image.resize_exact(w, h, FilterType::Lanczos3).to_rgb8()
}

/// Encode in the source container: JPEG at the fixed quality, everything
/// else with its encoder defaults.
pub fn encode(image: &RgbImage, format: ImageFormat) -> Result<Vec<u8>, ImagingError> {
    let mut buffer = Cursor::new(Vec::new());
    match format {
        ImageFormat::Jpeg => JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY)
            .encode_image(image)
            .map_err(ImagingError::Encode)?,
        other => image
            .write_to(&mut buffer, other)
            .map_err(ImagingError::Encode)?,
    }
    Ok(buffer.into_inner())
}

/// Reject encoded output that exceeds the byte budget.
pub fn check_budget(encoded: &[u8], max_bytes: u64) -> Result<(), ImagingError> {
    let actual = encoded.len() as u64;
    if actual > max_bytes {
        return Err(ImagingError::OverBudget {
            actual,
            limit: max_bytes,
        });
    }
    Ok(())
}
