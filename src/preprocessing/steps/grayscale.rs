use image::{GrayImage, RgbImage};

/// Convert a color image to single-channel luminance
/// This is the first step of every pipeline
pub fn apply(image: &RgbImage) -> GrayImage {
    image::imageops::grayscale(image)
}
