//! 2x2 morphology on black-on-white images.
//!
//! Erosion takes the minimum over the pixel and its left, upper and
//! upper-left neighbours, so it grows ink. Dilation uses the mirrored element
//! so that an opening does not shift strokes.

use image::{GrayImage, Luma};
use imageproc::morphology::{grayscale_dilate, grayscale_erode, Mask};

/// 2x2 square with its anchor at the bottom-right corner
fn upper_left_mask() -> Mask {
    Mask::from_image(&GrayImage::from_pixel(2, 2, Luma([255u8])), 1, 1)
}

/// 2x2 square with its anchor at the top-left corner
fn lower_right_mask() -> Mask {
    Mask::from_image(&GrayImage::from_pixel(2, 2, Luma([255u8])), 0, 0)
}

/// Grow dark strokes by one pixel to the right and downwards
pub fn thicken_ink(image: &GrayImage) -> GrayImage {
    grayscale_erode(image, &upper_left_mask())
}

/// Opening with a 2x2 square.
///
/// White specks and pinholes smaller than the element are filled with ink.
/// Ink itself never shrinks below its original footprint.
pub fn open(image: &GrayImage) -> GrayImage {
    grayscale_dilate(&grayscale_erode(image, &upper_left_mask()), &lower_right_mask())
}
