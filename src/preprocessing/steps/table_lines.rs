use super::morphology;
use image::{GrayImage, Luma};

/// Shortest run (pixels) that can count as a ruling line
pub const MIN_LINE_LENGTH: u32 = 20;
/// Lines must also span at least 1/LINE_FRACTION of the image dimension
pub const LINE_FRACTION: u32 = 25;
/// Pixels darker than this count as ink
const INK_LEVEL: u8 = 128;

/// Remove horizontal and vertical ruling lines from a binarized image
/// Table grids and underlines confuse layout analysis and produce junk tokens
pub fn apply(image: &GrayImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let horizontal_len = MIN_LINE_LENGTH.max(width / LINE_FRACTION);
    let vertical_len = MIN_LINE_LENGTH.max(height / LINE_FRACTION);

    let lines = line_mask(image, horizontal_len, vertical_len);
    let removed = lines.iter().filter(|&&is_line| is_line).count();
    tracing::trace!(horizontal_len, vertical_len, removed, "Ruling lines detected");

    let cleaned = GrayImage::from_fn(width, height, |x, y| {
        if image.get_pixel(x, y).0[0] < INK_LEVEL && !lines[pixel_index(width, x, y)] {
            Luma([0u8])
        } else {
            Luma([255u8])
        }
    });

    morphology::open(&cleaned)
}

/// Row-major offset, computed in usize so large upscaled scans cannot wrap
fn pixel_index(width: u32, x: u32, y: u32) -> usize {
    y as usize * width as usize + x as usize
}

/// Ink pixels belonging to a horizontal run of at least `horizontal_len`
/// or a vertical run of at least `vertical_len`.
///
/// This is exactly a morphological opening with a one-pixel-thick line
/// kernel of that length, computed from run lengths.
fn line_mask(img: &GrayImage, horizontal_len: u32, vertical_len: u32) -> Vec<bool> {
    let (width, height) = img.dimensions();
    let is_ink = |x: u32, y: u32| img.get_pixel(x, y).0[0] < INK_LEVEL;
    let mut mask = vec![false; width as usize * height as usize];

    for y in 0..height {
        let mut x = 0;
        while x < width {
            if !is_ink(x, y) {
                x += 1;
                continue;
            }
            let start = x;
            while x < width && is_ink(x, y) {
                x += 1;
            }
            if x - start >= horizontal_len {
                for rx in start..x {
                    mask[pixel_index(width, rx, y)] = true;
                }
            }
        }
    }

    for x in 0..width {
        let mut y = 0;
        while y < height {
            if !is_ink(x, y) {
                y += 1;
                continue;
            }
            let start = y;
            while y < height && is_ink(x, y) {
                y += 1;
            }
            if y - start >= vertical_len {
                for ry in start..y {
                    mask[pixel_index(width, x, ry)] = true;
                }
            }
        }
    }

    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(img: &mut GrayImage, x0: u32, y0: u32, x1: u32, y1: u32) {
        for y in y0..y1 {
            for x in x0..x1 {
                img.put_pixel(x, y, Luma([0]));
            }
        }
    }

    #[test]
    fn test_removes_grid_keeps_glyphs() {
        let mut img = GrayImage::from_pixel(200, 120, Luma([255]));
        // Horizontal rule, 3 px thick, full width
        fill(&mut img, 0, 40, 200, 43);
        // Vertical rule, 3 px thick, full height
        fill(&mut img, 100, 0, 103, 120);
        // A "glyph" shorter than the line length in both directions
        fill(&mut img, 20, 70, 30, 85);

        let result = apply(&img);

        assert_eq!(result.get_pixel(150, 41).0[0], 255);
        assert_eq!(result.get_pixel(101, 10).0[0], 255);
        assert_eq!(result.get_pixel(25, 77).0[0], 0);
    }

    #[test]
    fn test_line_length_scales_with_image() {
        // 1000 px wide: lines must be at least 40 px long
        let mut img = GrayImage::from_pixel(1000, 100, Luma([255]));
        fill(&mut img, 100, 50, 130, 53); // 30 px dash survives
        fill(&mut img, 300, 50, 345, 53); // 45 px rule is removed

        let result = apply(&img);

        assert_eq!(result.get_pixel(115, 51).0[0], 0);
        assert_eq!(result.get_pixel(320, 51).0[0], 255);
    }

    #[test]
    fn test_pixel_index_does_not_wrap() {
        assert_eq!(pixel_index(70_000, 5, 70_000), 70_000usize * 70_000 + 5);
    }

    #[test]
    fn test_output_is_binary() {
        let img = GrayImage::from_fn(60, 60, |x, y| Luma([((x * 7 + y * 3) % 256) as u8]));
        let result = apply(&img);
        assert!(result.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }
}
