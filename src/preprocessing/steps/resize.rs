use crate::error::OcrError;
use image::{imageops::FilterType, GrayImage};

/// Upscale factor used by the Otsu family of pipelines
pub const OTSU_SCALE: f32 = 2.5;
/// Upscale factor used by the adaptive family of pipelines
pub const ADAPTIVE_SCALE: f32 = 2.0;

/// Dimensions of an image scaled by `factor`, rounded and at least 1 px
pub fn scaled_dimensions(width: u32, height: u32, factor: f32) -> (u32, u32) {
    let scale = |v: u32| ((v as f32 * factor).round() as u32).max(1);
    (scale(width), scale(height))
}

/// Upscale image by a fixed factor with cubic interpolation
/// Small glyphs recognize much better at roughly 2-3x their scanned size
pub fn apply(image: &GrayImage, factor: f32) -> Result<GrayImage, OcrError> {
    if !(factor.is_finite() && factor > 0.0) {
        return Err(OcrError::PreprocessingError(format!(
            "Invalid scale factor: {}",
            factor
        )));
    }

    let (width, height) = image.dimensions();
    let (new_width, new_height) = scaled_dimensions(width, height, factor);

    Ok(image::imageops::resize(
        image,
        new_width,
        new_height,
        FilterType::CatmullRom,
    ))
}
