//! Debug rendering of recognized word boxes.

use crate::selector::SelectionOutcome;
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const BOX_THICKNESS: i32 = 2;

/// Draw the outcome's word boxes.
///
/// Boxes go onto a copy of the original image when they can be mapped back,
/// otherwise onto the preprocessed image the engine actually saw.
pub fn draw_boxes(original: &RgbImage, outcome: &SelectionOutcome) -> RgbImage {
    let (mut canvas, boxes) = match outcome.original_boxes() {
        Some(boxes) => (original.clone(), boxes),
        None => (
            DynamicImage::ImageLuma8(outcome.image.clone()).to_rgb8(),
            outcome.detections.iter().map(|w| w.bbox).collect(),
        ),
    };

    for bbox in boxes {
        for inset in 0..BOX_THICKNESS {
            let w = bbox.w - 2 * inset;
            let h = bbox.h - 2 * inset;
            if w <= 0 || h <= 0 {
                break;
            }
            let rect = Rect::at(bbox.x + inset, bbox.y + inset).of_size(w as u32, h as u32);
            draw_hollow_rect_mut(&mut canvas, rect, BOX_COLOR);
        }
    }

    canvas
}
