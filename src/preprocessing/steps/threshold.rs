use image::{GrayImage, Luma};
use imageproc::contrast::otsu_level;
use imageproc::filter::separable_filter_equal;

/// Adaptive threshold window (pixels per side), sets the Gaussian sigma
pub const ADAPTIVE_WINDOW: u32 = 31;
/// Amount subtracted from the local mean before comparing
pub const ADAPTIVE_BIAS: f64 = 10.0;

/// Global binarization at the Otsu level
/// Works well on evenly lit scans with good contrast
pub fn otsu(image: &GrayImage) -> GrayImage {
    let level = otsu_level(image);
    tracing::trace!(level, "Otsu level");
    binarize_above(image, level)
}

/// Gaussian-weighted local mean thresholding
/// Better than Otsu for photos with uneven lighting or shadows
pub fn adaptive(image: &GrayImage) -> GrayImage {
    adaptive_gaussian_threshold(image, ADAPTIVE_WINDOW, ADAPTIVE_BIAS)
}

fn binarize_above(image: &GrayImage, level: u8) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        if image.get_pixel(x, y).0[0] > level {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}

/// Gaussian sigma matching a square window of `window_size` pixels
fn window_sigma(window_size: u32) -> f32 {
    0.3 * ((window_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalized 1-D Gaussian spanning the whole window
fn window_kernel(window_size: u32) -> Vec<f32> {
    let sigma = window_sigma(window_size);
    let radius = (window_size / 2) as i32;
    let weights: Vec<f32> = (-radius..=radius)
        .map(|i| (-((i * i) as f32) / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

/// For each pixel, threshold = weighted local mean - bias; brighter pixels become white
fn adaptive_gaussian_threshold(img: &GrayImage, window_size: u32, bias: f64) -> GrayImage {
    let local_mean = separable_filter_equal(img, &window_kernel(window_size));

    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        let pixel = img.get_pixel(x, y).0[0] as f64;
        let mean = local_mean.get_pixel(x, y).0[0] as f64;
        if pixel > mean - bias {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_binary(img: &GrayImage) -> bool {
        img.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255)
    }

    #[test]
    fn test_otsu_binarizes_image() {
        let img = GrayImage::from_fn(50, 50, |x, _| Luma([(x as u8 * 5).min(255)]));
        let result = otsu(&img);
        assert!(is_binary(&result));
    }

    #[test]
    fn test_otsu_separates_bimodal_image() {
        let img = GrayImage::from_fn(40, 10, |x, _| if x < 20 { Luma([40]) } else { Luma([210]) });
        let result = otsu(&img);
        assert_eq!(result.get_pixel(5, 5).0[0], 0);
        assert_eq!(result.get_pixel(35, 5).0[0], 255);
    }

    #[test]
    fn test_adaptive_handles_text_pattern() {
        // Create dark text on light background
        let mut img = GrayImage::from_pixel(50, 20, Luma([240]));
        for x in 10..40 {
            img.put_pixel(x, 10, Luma([20])); // dark text
        }

        let result = adaptive(&img);

        assert!(is_binary(&result));
        // Text pixels should be black (0)
        assert_eq!(result.get_pixel(25, 10).0[0], 0);
        // Background should be white (255)
        assert_eq!(result.get_pixel(25, 5).0[0], 255);
    }

    #[test]
    fn test_adaptive_ignores_lighting_gradient() {
        // Smooth left-to-right shading with no text stays white
        let img = GrayImage::from_fn(120, 20, |x, _| Luma([100 + x as u8]));
        let result = adaptive(&img);
        assert!(result.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn test_window_kernel() {
        assert!((window_sigma(ADAPTIVE_WINDOW) - 5.0).abs() < 1e-6);

        let kernel = window_kernel(ADAPTIVE_WINDOW);
        assert_eq!(kernel.len(), 31);
        assert!((kernel.iter().sum::<f32>() - 1.0).abs() < 1e-4);
        assert!(kernel[15] > kernel[14]);
        assert_eq!(kernel[0], kernel[30]);
    }

    #[test]
    fn test_adaptive_weights_nearby_pixels_more() {
        // Faint stroke on a bright background with a dark band 12 px away.
        // An unweighted mean over the 31 px window would drop the threshold
        // far enough to lose the stroke.
        let img = GrayImage::from_fn(60, 60, |_, y| match y {
            30 => Luma([200]),
            42..=56 => Luma([0]),
            _ => Luma([220]),
        });

        let result = adaptive(&img);

        assert!(is_binary(&result));
        assert_eq!(result.get_pixel(30, 30).0[0], 0);
    }
}
