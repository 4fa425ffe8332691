//! Leptess/Tesseract engine implementation
//!
//! Tesseract linked into the binary through the tesseract-static crate, so no
//! system installation is needed. Expects traineddata files in the configured
//! tessdata directory (or wherever TESSDATA_PREFIX points).

use super::parse_tsv;
use crate::config::Config;
use crate::engine::{SegmentationMode, WordDetection, WordDetector};
use crate::error::OcrError;
use image::GrayImage;
use tesseract_static::tesseract::Tesseract;

/// Tesseract variable selecting the page segmentation mode
pub const PAGE_SEG_MODE_VARIABLE: &str = "tessedit_pageseg_mode";

/// Tesseract OCR Engine
pub struct LeptessEngine {
    /// Path to tessdata directory, `None` for the library default
    tessdata_path: Option<String>,
}

impl LeptessEngine {
    /// Create a new Tesseract-based OCR engine
    pub fn new(config: &Config) -> Result<Self, OcrError> {
        let tessdata_path = config.tessdata_path.clone();

        // Validate that tessdata is accessible by doing a test initialization
        let test_tess = Tesseract::new(tessdata_path.as_deref(), None).map_err(|e| {
            OcrError::InitializationError(format!("Failed to initialize Tesseract: {}", e))
        })?;

        // Drop the test instance
        drop(test_tess);

        tracing::info!(
            "Leptess engine initialized (tessdata: {})",
            tessdata_path.as_deref().unwrap_or("default")
        );

        Ok(Self { tessdata_path })
    }
}

/// Value of `PAGE_SEG_MODE_VARIABLE` for a segmentation mode
fn page_seg_mode_value(mode: SegmentationMode) -> String {
    mode.code().to_string()
}

impl WordDetector for LeptessEngine {
    fn name(&self) -> &'static str {
        "leptess"
    }

    fn detect(
        &self,
        image: &GrayImage,
        mode: SegmentationMode,
    ) -> Result<Vec<WordDetection>, OcrError> {
        let (width, height) = image.dimensions();

        // Convert to BMP in memory (BMP is always supported by leptonica)
        let mut bmp_data = Vec::new();
        {
            let mut cursor = std::io::Cursor::new(&mut bmp_data);
            image::DynamicImage::ImageLuma8(image.clone())
                .to_rgb8()
                .write_to(&mut cursor, image::ImageFormat::Bmp)
                .map_err(|e| {
                    OcrError::ProcessingError(format!("Failed to convert to BMP: {}", e))
                })?;
        }

        tracing::trace!(
            "Processing image: {}x{}, BMP size: {} bytes, {}",
            width,
            height,
            bmp_data.len(),
            mode
        );

        let mut tess = Tesseract::new(self.tessdata_path.as_deref(), None)
            .map_err(|e| OcrError::ProcessingError(format!("Failed to create Tesseract: {}", e)))?;

        tess = tess
            .set_variable(PAGE_SEG_MODE_VARIABLE, &page_seg_mode_value(mode))
            .map_err(|e| {
                OcrError::ProcessingError(format!("Failed to set segmentation {}: {}", mode, e))
            })?;

        tess = tess.set_image_from_mem(&bmp_data).map_err(|e| {
            OcrError::ProcessingError(format!(
                "Failed to set image ({}x{}, {} bytes): {}",
                width,
                height,
                bmp_data.len(),
                e
            ))
        })?;

        tess = tess
            .recognize()
            .map_err(|e| OcrError::ProcessingError(format!("Failed to recognize text: {}", e)))?;

        let tsv = tess
            .get_tsv_text(0)
            .map_err(|e| OcrError::ProcessingError(format!("Failed to get TSV: {}", e)))?;

        Ok(parse_tsv(&tsv))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_seg_mode_values() {
        assert_eq!(PAGE_SEG_MODE_VARIABLE, "tessedit_pageseg_mode");
        assert_eq!(page_seg_mode_value(SegmentationMode::SingleColumn), "4");
        assert_eq!(page_seg_mode_value(SegmentationMode::SingleBlock), "6");
        assert_eq!(page_seg_mode_value(SegmentationMode::SingleLine), "7");
        assert_eq!(page_seg_mode_value(SegmentationMode::SparseText), "11");
    }
}
