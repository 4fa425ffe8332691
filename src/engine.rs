use crate::error::OcrError;
use image::GrayImage;
use serde::Serialize;
use std::fmt;

/// Minimum confidence a word needs to survive the post-filter
pub const MIN_WORD_CONFIDENCE: f32 = 20.0;
/// Boxes this size or smaller (in either dimension) are treated as noise
pub const MIN_BOX_SIDE: u32 = 5;

/// Tesseract page segmentation mode used for one OCR attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentationMode {
    /// Single column of text of variable sizes (`--psm 4`)
    SingleColumn,
    /// Single uniform block of text (`--psm 6`)
    SingleBlock,
    /// Single text line (`--psm 7`)
    SingleLine,
    /// Sparse text, as much as possible in no particular order (`--psm 11`)
    SparseText,
}

impl SegmentationMode {
    /// Numeric code understood by the engine
    pub fn code(self) -> u8 {
        match self {
            Self::SingleColumn => 4,
            Self::SingleBlock => 6,
            Self::SingleLine => 7,
            Self::SparseText => 11,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            4 => Some(Self::SingleColumn),
            6 => Some(Self::SingleBlock),
            7 => Some(Self::SingleLine),
            11 => Some(Self::SparseText),
            _ => None,
        }
    }
}

impl fmt::Display for SegmentationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "psm{}", self.code())
    }
}

/// Axis-aligned word box in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Map a box from an upscaled frame back to the source frame.
    ///
    /// Each component is divided by `scale` and truncated toward zero. Only
    /// meaningful for transforms that did not rotate the canvas.
    pub fn to_original(&self, scale: f32) -> Self {
        let s = f64::from(scale);
        let map = |v: i32| (f64::from(v) / s).trunc() as i32;
        Self {
            x: map(self.x),
            y: map(self.y),
            w: map(self.w),
            h: map(self.h),
        }
    }
}

/// One recognized word as reported by an OCR engine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordDetection {
    pub text: String,
    /// Engine confidence on a 0-100 scale; negative means unknown
    pub confidence: f32,
    pub bbox: BoundingBox,
}

impl WordDetection {
    pub fn new(text: impl Into<String>, confidence: f32, bbox: BoundingBox) -> Self {
        Self {
            text: text.into(),
            confidence,
            bbox,
        }
    }
}

/// Trait that all OCR engines must implement
pub trait WordDetector: Send + Sync {
    /// Returns the engine identifier (e.g., "tesseract-cli", "leptess")
    fn name(&self) -> &'static str;

    /// Run word-level recognition on a single-channel image.
    ///
    /// Returned boxes are in `image`'s coordinate frame, in engine order.
    fn detect(
        &self,
        image: &GrayImage,
        mode: SegmentationMode,
    ) -> Result<Vec<WordDetection>, OcrError>;
}

/// Drop empty, tiny and low-confidence words, trimming the rest.
pub fn filter_detections(raw: Vec<WordDetection>) -> Vec<WordDetection> {
    raw.into_iter()
        .filter_map(|word| {
            let text = word.text.trim();
            if text.is_empty() {
                return None;
            }
            if word.bbox.w <= MIN_BOX_SIDE as i32 || word.bbox.h <= MIN_BOX_SIDE as i32 {
                return None;
            }
            // NaN compares false and is dropped with the rest
            if !(word.confidence >= MIN_WORD_CONFIDENCE) {
                return None;
            }
            Some(WordDetection {
                text: text.to_string(),
                ..word
            })
        })
        .collect()
}
