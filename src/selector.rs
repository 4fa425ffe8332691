//! Runs every pipeline of a catalog against one image and keeps the best.

use crate::engine::{filter_detections, BoundingBox, WordDetection, WordDetector};
use crate::error::OcrError;
use crate::preprocessing::PipelineDescriptor;
use crate::scoring::{mean_confidence, score_detections};
use image::{DynamicImage, GrayImage, RgbImage};
use std::time::Instant;

/// Appended to the reported pipeline name when the winner is not trustworthy
pub const UNRELIABLE_SUFFIX: &str = "__UNRELIABLE";

/// Reliability gate applied to the winning pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Minimum mean confidence over the kept words
    pub min_mean_conf: f64,
    /// Minimum number of kept words
    pub min_words: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_mean_conf: 15.0,
            min_words: 3,
        }
    }
}

/// Result of one pipeline run, before reduction
#[derive(Debug, Clone)]
pub struct ScoredResult<'a> {
    pub descriptor: &'a PipelineDescriptor,
    pub image: GrayImage,
    pub detections: Vec<WordDetection>,
    pub score: Option<f64>,
}

/// The winning pipeline for one image
#[derive(Debug, Clone)]
pub struct SelectionOutcome {
    /// Catalog entry that won, unchanged
    pub descriptor: PipelineDescriptor,
    /// Name to report; carries `UNRELIABLE_SUFFIX` when the gate failed
    pub name: String,
    /// Preprocessed image the detections refer to
    pub image: GrayImage,
    pub detections: Vec<WordDetection>,
    /// `None` when no pipeline produced a usable detection
    pub score: Option<f64>,
    pub reliable: bool,
}

impl SelectionOutcome {
    /// Recognized words joined by single spaces
    pub fn text(&self) -> String {
        self.detections
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn mean_confidence(&self) -> f64 {
        mean_confidence(&self.detections)
    }

    /// Word boxes in the original image's frame.
    ///
    /// `None` when the winning transform rotated the canvas, in which case
    /// dividing by the scale no longer lands on the right pixels.
    pub fn original_boxes(&self) -> Option<Vec<BoundingBox>> {
        if !self.descriptor.coordinate_mapping_valid() {
            return None;
        }
        let scale = self.descriptor.scale();
        Some(
            self.detections
                .iter()
                .map(|w| w.bbox.to_original(scale))
                .collect(),
        )
    }
}

/// Picks the best preprocessing pipeline for each image
pub struct Selector<'a> {
    detector: &'a dyn WordDetector,
    thresholds: Thresholds,
}

impl<'a> Selector<'a> {
    pub fn new(detector: &'a dyn WordDetector) -> Self {
        Self {
            detector,
            thresholds: Thresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Run every pipeline of `catalog` on `image` and return the best one.
    ///
    /// Pipelines run in catalog order and the earliest wins ties. A failing
    /// OCR call only disqualifies its own pipeline.
    pub fn select(
        &self,
        image: &DynamicImage,
        catalog: &[PipelineDescriptor],
    ) -> Result<SelectionOutcome, OcrError> {
        if catalog.is_empty() {
            return Err(OcrError::EmptyCatalog);
        }
        let rgb = validate_input(image)?;
        let start = Instant::now();

        let mut best: Option<ScoredResult> = None;
        for descriptor in catalog {
            let candidate = self.run_pipeline(rgb, descriptor)?;
            if best
                .as_ref()
                .map_or(true, |b| is_better(candidate.score, b.score))
            {
                best = Some(candidate);
            }
        }

        // Non-empty catalog always leaves a winner
        let best = best.ok_or(OcrError::EmptyCatalog)?;
        let outcome = self.finish(best);

        tracing::info!(
            pipeline = %outcome.name,
            score = ?outcome.score,
            words = outcome.detections.len(),
            time_ms = start.elapsed().as_millis() as u64,
            "Pipeline selected"
        );

        Ok(outcome)
    }

    /// Transform, recognize, filter and score with a single pipeline
    pub fn run_pipeline<'c>(
        &self,
        image: &RgbImage,
        descriptor: &'c PipelineDescriptor,
    ) -> Result<ScoredResult<'c>, OcrError> {
        let preprocessed = descriptor.transform().apply(image)?;

        let detections = match self.detector.detect(&preprocessed, descriptor.mode()) {
            Ok(raw) => filter_detections(raw),
            Err(e) => {
                tracing::warn!(
                    pipeline = descriptor.name(),
                    engine = self.detector.name(),
                    "OCR failed, pipeline disqualified: {}",
                    e
                );
                Vec::new()
            }
        };
        let score = score_detections(&detections);

        tracing::debug!(
            pipeline = descriptor.name(),
            words = detections.len(),
            score = ?score,
            "Pipeline scored"
        );

        Ok(ScoredResult {
            descriptor,
            image: preprocessed,
            detections,
            score,
        })
    }

    /// Apply the reliability gate and build the outcome
    fn finish(&self, best: ScoredResult<'_>) -> SelectionOutcome {
        let mean_conf = mean_confidence(&best.detections);
        let reliable = mean_conf >= self.thresholds.min_mean_conf
            && best.detections.len() >= self.thresholds.min_words;

        let name = if reliable {
            best.descriptor.name().to_string()
        } else {
            format!("{}{}", best.descriptor.name(), UNRELIABLE_SUFFIX)
        };

        SelectionOutcome {
            descriptor: *best.descriptor,
            name,
            image: best.image,
            detections: best.detections,
            score: best.score,
            reliable,
        }
    }
}

/// Strict comparison where any score beats a missing one
fn is_better(candidate: Option<f64>, current: Option<f64>) -> bool {
    match (candidate, current) {
        (Some(c), Some(b)) => c > b,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

fn validate_input(image: &DynamicImage) -> Result<&RgbImage, OcrError> {
    let rgb = image.as_rgb8().ok_or_else(|| {
        OcrError::InvalidImage(format!(
            "expected 8-bit 3-channel color image, got {:?}",
            image.color()
        ))
    })?;
    if rgb.width() == 0 || rgb.height() == 0 {
        return Err(OcrError::InvalidImage(format!(
            "image has zero dimension ({}x{})",
            rgb.width(),
            rgb.height()
        )));
    }
    Ok(rgb)
}
