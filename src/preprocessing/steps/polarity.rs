use image::GrayImage;

/// Mean intensity below which a binary image is considered white-on-black
const MIDPOINT: f64 = 127.0;

/// Make sure text is black on a white background
/// A binary image whose mean is dark has more ink than paper, so it is inverted
pub fn apply(mut image: GrayImage) -> GrayImage {
    if mean_intensity(&image) < MIDPOINT {
        image::imageops::invert(&mut image);
    }
    image
}

pub fn mean_intensity(img: &GrayImage) -> f64 {
    let count = img.width() as u64 * img.height() as u64;
    if count == 0 {
        return 0.0;
    }
    let total: u64 = img.pixels().map(|p| p.0[0] as u64).sum();
    total as f64 / count as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_polarity_inverts_dark_background() {
        // White text on black
        let mut img = GrayImage::from_pixel(10, 10, Luma([0]));
        img.put_pixel(5, 5, Luma([255]));

        let result = apply(img);

        assert_eq!(result.get_pixel(0, 0).0[0], 255);
        assert_eq!(result.get_pixel(5, 5).0[0], 0);
    }

    #[test]
    fn test_polarity_keeps_light_background() {
        let mut img = GrayImage::from_pixel(10, 10, Luma([255]));
        img.put_pixel(5, 5, Luma([0]));

        let result = apply(img.clone());

        assert_eq!(result, img);
    }

    #[test]
    fn test_mean_intensity() {
        let img = GrayImage::from_fn(2, 1, |x, _| if x == 0 { Luma([0]) } else { Luma([255]) });
        assert_eq!(mean_intensity(&img), 127.5);
    }
}
