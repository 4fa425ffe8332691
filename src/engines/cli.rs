//! Tesseract command-line engine implementation
//!
//! Runs the system `tesseract` binary once per OCR attempt and parses its TSV
//! output. The binary path and tessdata directory are fixed at construction.

use super::parse_tsv;
use crate::config::Config;
use crate::engine::{SegmentationMode, WordDetection, WordDetector};
use crate::error::OcrError;
use image::GrayImage;
use std::process::Command;

/// OCR engine mode: default (LSTM where available)
const ENGINE_MODE: &str = "3";

/// Tesseract OCR engine driven through its command-line interface
pub struct TesseractCli {
    /// Binary to execute
    command: String,
    /// Optional tessdata directory passed via `--tessdata-dir`
    tessdata_path: Option<String>,
}

impl TesseractCli {
    pub fn new(config: &Config) -> Result<Self, OcrError> {
        let engine = Self {
            command: config.tesseract_cmd.clone(),
            tessdata_path: config.tessdata_path.clone(),
        };

        // A missing binary is not fatal: every pipeline will just score empty
        match engine.version() {
            Ok(version) => tracing::info!("Tesseract CLI engine ready ({})", version),
            Err(e) => tracing::warn!(
                "Tesseract binary '{}' is not usable, OCR will return nothing: {}",
                engine.command,
                e
            ),
        }

        Ok(engine)
    }

    /// First line of `tesseract --version`
    pub fn version(&self) -> Result<String, OcrError> {
        let output = Command::new(&self.command)
            .arg("--version")
            .output()
            .map_err(|e| {
                OcrError::InitializationError(format!(
                    "Failed to run {} --version: {}",
                    self.command, e
                ))
            })?;

        // Older releases print the version on stderr
        let text = if output.stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr).to_string()
        } else {
            String::from_utf8_lossy(&output.stdout).to_string()
        };
        Ok(text.lines().next().unwrap_or_default().trim().to_string())
    }

    fn run_tsv(&self, path: &std::path::Path, mode: SegmentationMode) -> Result<String, OcrError> {
        let mut command = Command::new(&self.command);
        command.arg(path).arg("stdout");
        if let Some(dir) = &self.tessdata_path {
            command.arg("--tessdata-dir").arg(dir);
        }
        command
            .arg("--oem")
            .arg(ENGINE_MODE)
            .arg("--psm")
            .arg(mode.code().to_string())
            .arg("tsv");

        let output = command.output().map_err(|e| {
            OcrError::ProcessingError(format!("Failed to run {}: {}", self.command, e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::ProcessingError(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl WordDetector for TesseractCli {
    fn name(&self) -> &'static str {
        "cli"
    }

    fn detect(
        &self,
        image: &GrayImage,
        mode: SegmentationMode,
    ) -> Result<Vec<WordDetection>, OcrError> {
        let temp_file = tempfile::Builder::new()
            .prefix("ocr-autoselect-")
            .suffix(".png")
            .tempfile()?;

        image
            .save_with_format(temp_file.path(), image::ImageFormat::Png)
            .map_err(|e| OcrError::ProcessingError(format!("Failed to write PNG: {}", e)))?;

        tracing::trace!(
            width = image.width(),
            height = image.height(),
            %mode,
            "Running tesseract"
        );

        let tsv = self.run_tsv(temp_file.path(), mode)?;
        Ok(parse_tsv(&tsv))
    }
}
