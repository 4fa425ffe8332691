use image::GrayImage;
use imageproc::filter::bilateral_filter;

/// Bilateral filter neighbourhood diameter in pixels
const DIAMETER: u32 = 7;
const SIGMA_COLOR: f32 = 50.0;
const SIGMA_SPACE: f32 = 50.0;

/// Apply an edge-preserving bilateral filter
/// Smooths paper texture and JPEG noise without blurring glyph edges
pub fn apply(image: &GrayImage) -> GrayImage {
    bilateral_filter(image, DIAMETER, SIGMA_COLOR, SIGMA_SPACE)
}
