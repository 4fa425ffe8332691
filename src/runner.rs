//! Batch driver: OCR every image in a directory and write the results.

use crate::config::Config;
use crate::engine::WordDetector;
use crate::error::OcrError;
use crate::preprocessing::default_catalog;
use crate::selector::Selector;
use crate::visualize;
use image::DynamicImage;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// File extensions picked up from the input directory
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

/// One kept word, as written to the metrics file
#[derive(Debug, Clone, Serialize)]
pub struct WordRow {
    pub image: String,
    pub pipeline: String,
    pub score: Option<f64>,
    pub text: String,
    pub conf: f32,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

/// What a batch run did
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub processed: usize,
    pub skipped: usize,
    pub unreliable: usize,
    pub words: usize,
}

struct OutputDirs {
    text: PathBuf,
    viz: PathBuf,
    metrics: PathBuf,
}

impl OutputDirs {
    fn create(root: &Path) -> Result<Self, OcrError> {
        let dirs = Self {
            text: root.join("text"),
            viz: root.join("viz"),
            metrics: root.join("metrics"),
        };
        for dir in [&dirs.text, &dirs.viz, &dirs.metrics] {
            fs::create_dir_all(dir)?;
        }
        Ok(dirs)
    }
}

/// Write the per-word rows as `ocr_words.csv` and `ocr_words.json`
pub fn write_metrics(dir: &Path, rows: &[WordRow]) -> Result<(), OcrError> {
    let csv_path = dir.join("ocr_words.csv");
    let mut writer = csv::Writer::from_path(&csv_path)
        .map_err(|e| OcrError::Internal(format!("Failed to create metrics CSV: {}", e)))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| OcrError::Internal(format!("Failed to write metrics row: {}", e)))?;
    }
    writer.flush()?;

    let json = serde_json::to_string_pretty(rows)
        .map_err(|e| OcrError::Internal(format!("Failed to serialize metrics: {}", e)))?;
    fs::write(dir.join("ocr_words.json"), json)?;

    tracing::info!("Saved per-word metrics: {}", csv_path.display());
    Ok(())
}

/// Image files directly inside `dir`, sorted by path
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>, OcrError> {
    let mut images = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_supported(&path) {
            images.push(path);
        }
    }
    images.sort();
    Ok(images)
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Process every image of `config.input_dir` with the built-in catalog
pub fn run(config: &Config, detector: &dyn WordDetector) -> Result<BatchSummary, OcrError> {
    let dirs = OutputDirs::create(&config.output_dir)?;
    let mut summary = BatchSummary::default();

    let images = list_images(&config.input_dir)?;
    if images.is_empty() {
        tracing::warn!(
            "No images found in {}; add at least one image and run again",
            config.input_dir.display()
        );
        return Ok(summary);
    }

    let selector = Selector::new(detector).with_thresholds(config.thresholds);
    let mut rows = Vec::new();

    for path in &images {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let original = match image::open(path) {
            Ok(img) => img.into_rgb8(),
            Err(e) => {
                tracing::warn!("Could not read image {}: {}", file_name, e);
                summary.skipped += 1;
                continue;
            }
        };
        if original.width() == 0 || original.height() == 0 {
            tracing::warn!("Skipping empty image {}", file_name);
            summary.skipped += 1;
            continue;
        }

        let input = DynamicImage::ImageRgb8(original);
        let outcome = selector.select(&input, default_catalog())?;

        outcome
            .image
            .save(dirs.viz.join(format!("{}_{}_pre.png", stem, outcome.name)))
            .map_err(|e| OcrError::ProcessingError(format!("Failed to save image: {}", e)))?;

        fs::write(dirs.text.join(format!("{}.txt", stem)), outcome.text())?;

        if !config.no_viz {
            let original = input.as_rgb8().ok_or_else(|| {
                OcrError::Internal("input lost its RGB representation".to_string())
            })?;
            visualize::draw_boxes(original, &outcome)
                .save(dirs.viz.join(format!("{}_ocr_boxes.png", stem)))
                .map_err(|e| OcrError::ProcessingError(format!("Failed to save image: {}", e)))?;
        }

        for word in &outcome.detections {
            rows.push(WordRow {
                image: file_name.clone(),
                pipeline: outcome.name.clone(),
                score: outcome.score,
                text: word.text.clone(),
                conf: word.confidence,
                x: word.bbox.x,
                y: word.bbox.y,
                w: word.bbox.w,
                h: word.bbox.h,
            });
        }

        summary.processed += 1;
        summary.words += outcome.detections.len();
        if !outcome.reliable {
            summary.unreliable += 1;
        }

        tracing::info!(
            "Processed: {} | pipeline={} | words_kept={}",
            file_name,
            outcome.name,
            outcome.detections.len()
        );
    }

    if rows.is_empty() {
        tracing::info!("No OCR words passed the filters");
    } else {
        write_metrics(&dirs.metrics, &rows)?;
    }

    Ok(summary)
}
