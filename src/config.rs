use crate::selector::Thresholds;
use std::path::PathBuf;

/// Batch run configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// OCR engine name ("cli" or "leptess")
    pub engine: String,
    /// Tesseract binary used by the CLI engine
    pub tesseract_cmd: String,
    pub tessdata_path: Option<String>,
    pub thresholds: Thresholds,
    /// Skip writing the box visualization images
    pub no_viz: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("data/sample_images"),
            output_dir: PathBuf::from("outputs"),
            engine: "cli".to_string(),
            tesseract_cmd: "tesseract".to_string(),
            tessdata_path: None,
            thresholds: Thresholds::default(),
            no_viz: false,
        }
    }
}
