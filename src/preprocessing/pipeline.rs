use crate::engine::SegmentationMode;
use crate::error::OcrError;
use image::{GrayImage, RgbImage};
use std::time::Instant;

use super::steps::{self, resize};

/// Image-enhancement strategy applied before OCR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transform {
    /// Upscale 2.5x, global Otsu threshold, thickened strokes
    Otsu,
    /// `Otsu`, then rotation correction
    OtsuDeskew,
    /// `Otsu`, then ruling-line removal
    OtsuTable,
    /// `Otsu`, rotation correction, then ruling-line removal
    OtsuTableDeskew,
    /// Upscale 2x, local adaptive threshold, speckle removal
    Adaptive,
    /// `Adaptive`, then rotation correction
    AdaptiveDeskew,
}

impl Transform {
    /// Get the transform name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Otsu => "otsu",
            Self::OtsuDeskew => "otsu_deskew",
            Self::OtsuTable => "otsu_table",
            Self::OtsuTableDeskew => "otsu_table_deskew",
            Self::Adaptive => "adaptive",
            Self::AdaptiveDeskew => "adaptive_deskew",
        }
    }

    /// Factor by which the output is larger than the input
    pub const fn scale(&self) -> f32 {
        match self {
            Self::Otsu | Self::OtsuDeskew | Self::OtsuTable | Self::OtsuTableDeskew => {
                resize::OTSU_SCALE
            }
            Self::Adaptive | Self::AdaptiveDeskew => resize::ADAPTIVE_SCALE,
        }
    }

    /// Whether the chain may rotate the canvas
    pub const fn rotates(&self) -> bool {
        matches!(
            self,
            Self::OtsuDeskew | Self::OtsuTableDeskew | Self::AdaptiveDeskew
        )
    }

    const fn uses_otsu(&self) -> bool {
        matches!(
            self,
            Self::Otsu | Self::OtsuDeskew | Self::OtsuTable | Self::OtsuTableDeskew
        )
    }

    const fn removes_lines(&self) -> bool {
        matches!(self, Self::OtsuTable | Self::OtsuTableDeskew)
    }

    /// Turn a color image into a black-on-white binary image ready for OCR
    pub fn apply(&self, image: &RgbImage) -> Result<GrayImage, OcrError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(OcrError::InvalidImage(format!(
                "image has zero dimension ({}x{})",
                width, height
            )));
        }

        let start = Instant::now();
        let scale = self.scale();

        let gray = run_step("grayscale", || Ok(steps::grayscale::apply(image)))?;
        let gray = run_step("resize", || resize::apply(&gray, scale))?;
        let gray = run_step("denoise", || Ok(steps::denoise::apply(&gray)))?;

        let mut img = if self.uses_otsu() {
            let binary = run_step("threshold", || Ok(steps::threshold::otsu(&gray)))?;
            let binary = steps::polarity::apply(binary);
            run_step("thicken", || Ok(steps::morphology::thicken_ink(&binary)))?
        } else {
            let binary = run_step("threshold", || Ok(steps::threshold::adaptive(&gray)))?;
            let binary = steps::polarity::apply(binary);
            run_step("despeckle", || Ok(steps::morphology::open(&binary)))?
        };

        if self.rotates() {
            img = run_step("deskew", || Ok(steps::deskew::apply(img)))?;
        }

        if self.removes_lines() {
            img = run_step("table_lines", || Ok(steps::table_lines::apply(&img)))?;
        }

        tracing::debug!(
            transform = self.as_str(),
            width = img.width(),
            height = img.height(),
            time_ms = start.elapsed().as_millis() as u64,
            "Preprocessing finished"
        );

        Ok(img)
    }
}

fn run_step<F>(name: &str, step_fn: F) -> Result<GrayImage, OcrError>
where
    F: FnOnce() -> Result<GrayImage, OcrError>,
{
    let step_start = Instant::now();
    let result = step_fn()?;
    tracing::trace!(
        step = name,
        time_ms = step_start.elapsed().as_millis() as u64,
        "Preprocessing step done"
    );
    Ok(result)
}

/// One entry of the pipeline catalog: a transform paired with an OCR mode
///
/// `scale` and `coordinate_mapping_valid` are derived from the transform so
/// they can never disagree with it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineDescriptor {
    name: &'static str,
    transform: Transform,
    mode: SegmentationMode,
    scale: f32,
    coordinate_mapping_valid: bool,
}

impl PipelineDescriptor {
    pub const fn new(name: &'static str, transform: Transform, mode: SegmentationMode) -> Self {
        Self {
            name,
            transform,
            mode,
            scale: transform.scale(),
            coordinate_mapping_valid: !transform.rotates(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn mode(&self) -> SegmentationMode {
        self.mode
    }

    /// Preprocessed size divided by original size
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Whether boxes can be mapped back by dividing by `scale`
    pub fn coordinate_mapping_valid(&self) -> bool {
        self.coordinate_mapping_valid
    }
}

/// The built-in pipelines, in selection order. Earlier entries win ties.
pub static CATALOG: [PipelineDescriptor; 8] = [
    // Tables / newspapers / grids
    PipelineDescriptor::new(
        "otsu_table_psm6",
        Transform::OtsuTable,
        SegmentationMode::SingleBlock,
    ),
    PipelineDescriptor::new(
        "otsu_table_deskew_psm6",
        Transform::OtsuTableDeskew,
        SegmentationMode::SingleBlock,
    ),
    // Clean documents
    PipelineDescriptor::new("otsu_psm6", Transform::Otsu, SegmentationMode::SingleBlock),
    PipelineDescriptor::new(
        "otsu_deskew_psm6",
        Transform::OtsuDeskew,
        SegmentationMode::SingleBlock,
    ),
    PipelineDescriptor::new("otsu_psm4", Transform::Otsu, SegmentationMode::SingleColumn),
    // Posters / sparse layouts
    PipelineDescriptor::new("adapt_psm11", Transform::Adaptive, SegmentationMode::SparseText),
    PipelineDescriptor::new(
        "adapt_deskew_psm11",
        Transform::AdaptiveDeskew,
        SegmentationMode::SparseText,
    ),
    // Single line attempt
    PipelineDescriptor::new("adapt_psm7", Transform::Adaptive, SegmentationMode::SingleLine),
];

/// The built-in catalog as a slice
pub fn default_catalog() -> &'static [PipelineDescriptor] {
    &CATALOG
}
