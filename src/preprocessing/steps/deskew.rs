use image::{GrayImage, Luma};
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};
use imageproc::geometry::min_area_rect;
use imageproc::point::Point;

/// Below this many ink pixels the skew estimate is meaningless
pub const MIN_FOREGROUND_PIXELS: usize = 200;
/// Corrections smaller than this (degrees) are left alone
pub const MIN_CORRECTION_DEGREES: f64 = 0.5;
/// Pixels darker than this count as ink
const INK_LEVEL: u8 = 128;

/// Deskew a binarized image by levelling its minimum-area bounding rectangle
///
/// The canvas is expanded so that no ink is cropped, and the new corners are
/// filled with white. Images with too little ink, or already within
/// `MIN_CORRECTION_DEGREES` of level, are returned untouched.
pub fn apply(image: GrayImage) -> GrayImage {
    let Some(angle) = estimate_correction(&image) else {
        tracing::trace!("Deskew skipped: not enough foreground");
        return image;
    };

    if angle.abs() < MIN_CORRECTION_DEGREES {
        return image;
    }

    tracing::debug!(angle, "Deskewing");
    rotate_expanded(&image, angle)
}

/// Rotation in degrees, in (-45, 45], that would level the ink.
///
/// Positive values rotate clockwise on screen. Returns `None` when there are
/// fewer than `MIN_FOREGROUND_PIXELS` ink pixels.
pub fn estimate_correction(image: &GrayImage) -> Option<f64> {
    let points = foreground_outline(image)?;
    let edge_angle = min_area_rect_angle(&points);

    // Legacy rotated-rect convention: the rectangle angle lies in [-90, 0)
    let rect_angle = edge_angle.rem_euclid(90.0) - 90.0;
    let angle = if rect_angle < -45.0 {
        -(90.0 + rect_angle)
    } else {
        -rect_angle
    };

    Some(angle)
}

/// Leftmost and rightmost ink pixel of every row.
///
/// The convex hull of these equals the hull of all ink pixels.
fn foreground_outline(img: &GrayImage) -> Option<Vec<Point<i32>>> {
    let (width, height) = img.dimensions();
    let mut count = 0usize;
    let mut points = Vec::new();

    for y in 0..height {
        let mut first = None;
        let mut last = 0;
        for x in 0..width {
            if img.get_pixel(x, y).0[0] < INK_LEVEL {
                count += 1;
                if first.is_none() {
                    first = Some(x);
                }
                last = x;
            }
        }
        if let Some(first) = first {
            points.push(Point::new(first as i32, y as i32));
            if last != first {
                points.push(Point::new(last as i32, y as i32));
            }
        }
    }

    if count < MIN_FOREGROUND_PIXELS {
        return None;
    }
    Some(points)
}

/// Direction in degrees of the longer side of the minimum-area rectangle.
///
/// Corners come back rounded to whole pixels, so the longer side gives the
/// steadier angle. A single point has no direction and reports 0.
fn min_area_rect_angle(points: &[Point<i32>]) -> f64 {
    let corners = min_area_rect(points);
    let edge = |a: Point<i32>, b: Point<i32>| ((b.x - a.x) as f64, (b.y - a.y) as f64);
    let (ax, ay) = edge(corners[0], corners[1]);
    let (bx, by) = edge(corners[1], corners[2]);

    let (dx, dy) = if ax.hypot(ay) >= bx.hypot(by) {
        (ax, ay)
    } else {
        (bx, by)
    };
    if dx == 0.0 && dy == 0.0 {
        return 0.0;
    }
    dy.atan2(dx).to_degrees()
}

/// Rotate clockwise by `degrees` about the center, growing the canvas to fit
pub fn rotate_expanded(img: &GrayImage, degrees: f64) -> GrayImage {
    let (width, height) = img.dimensions();
    let theta = degrees.to_radians();
    let (sin, cos) = (theta.sin().abs(), theta.cos().abs());

    let new_width = ((height as f64 * sin + width as f64 * cos) as u32).max(1);
    let new_height = ((height as f64 * cos + width as f64 * sin) as u32).max(1);

    let projection = Projection::translate(new_width as f32 / 2.0, new_height as f32 / 2.0)
        * Projection::rotate(theta as f32)
        * Projection::translate(-(width as f32) / 2.0, -(height as f32) / 2.0);

    let mut out = GrayImage::from_pixel(new_width, new_height, Luma([255u8]));
    warp_into(
        img,
        &projection,
        Interpolation::Bilinear,
        Luma([255u8]),
        &mut out,
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// White canvas with a solid black bar rotated clockwise by `degrees`
    fn rotated_bar(degrees: f64) -> GrayImage {
        let (width, height) = (400u32, 300u32);
        let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);
        let theta = degrees.to_radians();
        GrayImage::from_fn(width, height, |x, y| {
            let dx = x as f64 - cx;
            let dy = y as f64 - cy;
            // Undo the rotation and test against the axis-aligned bar
            let u = dx * theta.cos() + dy * theta.sin();
            let v = -dx * theta.sin() + dy * theta.cos();
            if u.abs() <= 120.0 && v.abs() <= 30.0 {
                Luma([0])
            } else {
                Luma([255])
            }
        })
    }

    #[test]
    fn test_deskew_passes_level_image_through() {
        let img = rotated_bar(0.0);
        let result = apply(img.clone());
        assert_eq!(result, img);
    }

    #[test]
    fn test_deskew_skips_sparse_image() {
        let mut img = GrayImage::from_pixel(100, 100, Luma([255]));
        // 150 ink pixels along a diagonal-ish stripe
        for i in 0..150u32 {
            img.put_pixel(i % 100, (i / 3) % 100, Luma([0]));
        }
        assert_eq!(estimate_correction(&img), None);
        let result = apply(img.clone());
        assert_eq!(result, img);
    }

    #[test]
    fn test_deskew_estimates_rotation() {
        let correction = estimate_correction(&rotated_bar(10.0)).unwrap();
        assert!((correction + 10.0).abs() < 1.0, "got {}", correction);

        let correction = estimate_correction(&rotated_bar(-7.0)).unwrap();
        assert!((correction - 7.0).abs() < 1.0, "got {}", correction);
    }

    #[test]
    fn test_deskew_levels_rotated_block() {
        let img = rotated_bar(10.0);
        let result = apply(img);

        // Canvas grows so the corners are not cropped
        assert!(result.width() > 400);
        assert!(result.height() > 300);

        let residual = estimate_correction(&result).unwrap();
        assert!(residual.abs() < 1.0, "residual skew {}", residual);
    }

    #[test]
    fn test_rotate_expanded_fills_white() {
        let img = GrayImage::from_pixel(50, 50, Luma([0]));
        let result = rotate_expanded(&img, 45.0);
        assert_eq!(result.get_pixel(0, 0).0[0], 255);
        let (w, h) = result.dimensions();
        assert!(result.get_pixel(w / 2, h / 2).0[0] < 128);
    }

    #[test]
    fn test_rect_angle_follows_long_side() {
        let points: Vec<Point<i32>> = (0..200)
            .flat_map(|i| [Point::new(i, 20 + i / 10), Point::new(i, 40 + i / 10)])
            .collect();
        let angle = min_area_rect_angle(&points);
        let expected = (0.1f64).atan().to_degrees();
        assert!((angle.rem_euclid(180.0) - expected).abs() < 1.5, "got {}", angle);
    }

    #[test]
    fn test_rect_angle_of_single_point() {
        assert_eq!(min_area_rect_angle(&[Point::new(3, 4)]), 0.0);
    }
}
