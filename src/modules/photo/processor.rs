//! Image decoding and WebP rendition for the photo pipeline.
//!
//! Everything here is CPU-bound and synchronous; callers run it on the
//! blocking pool.

use image::{imageops::FilterType, DynamicImage, GenericImageView, ImageReader};
use std::io::Cursor;

use crate::api::error;

/// Decode an uploaded buffer. The format is sniffed from the bytes, and an image
/// that does not report both dimensions is rejected.
pub fn decode(data: &[u8]) -> Result<DynamicImage, error::SystemError> {
    let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
    if reader.format().is_none() {
        return Err(error::SystemError::bad_request("Invalid image file"));
    }

    let img = reader.decode()?;
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(error::SystemError::bad_request("Invalid image file"));
    }
    Ok(img)
}

/// Width and height when `data` is a decodable image header, `None` otherwise.
pub fn dimensions(data: &[u8]) -> Option<(u32, u32)> {
    ImageReader::new(Cursor::new(data)).with_guessed_format().ok()?.into_dimensions().ok()
}

pub fn encode_webp(img: &DynamicImage, quality: f32) -> Vec<u8> {
    let (width, height) = img.dimensions();
    let rgba_img = img.to_rgba8();
    let encoder = webp::Encoder::from_rgba(&rgba_img, width, height);
    encoder.encode(quality).to_vec()
}

/// Square `size`x`size` rendition: scale to cover, then center-crop.
pub fn render_square(img: &DynamicImage, size: u32, quality: f32) -> Vec<u8> {
    let resized = img.resize_to_fill(size, size, FilterType::Lanczos3);
    encode_webp(&resized, quality)
}
