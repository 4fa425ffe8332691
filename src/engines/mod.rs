//! OCR engine implementations
//!
//! This module contains implementations of the WordDetector trait for
//! different Tesseract front-ends. Engines are conditionally compiled based
//! on feature flags.

#[cfg(feature = "engine-cli")]
pub mod cli;

#[cfg(feature = "engine-leptess")]
pub mod leptess;

use crate::config::Config;
use crate::engine::{BoundingBox, WordDetection, WordDetector};
use crate::error::OcrError;

/// Tesseract TSV level for word rows
const WORD_LEVEL: &str = "5";

/// Names of the engines compiled into this build
pub fn available() -> Vec<&'static str> {
    let mut names = Vec::new();
    #[cfg(feature = "engine-cli")]
    names.push("cli");
    #[cfg(feature = "engine-leptess")]
    names.push("leptess");
    names
}

/// Build the engine selected in the configuration
pub fn build(config: &Config) -> Result<Box<dyn WordDetector>, OcrError> {
    match config.engine.as_str() {
        #[cfg(feature = "engine-cli")]
        "cli" => {
            tracing::info!("Initializing tesseract CLI engine...");
            Ok(Box::new(cli::TesseractCli::new(config)?))
        }
        #[cfg(feature = "engine-leptess")]
        "leptess" => {
            tracing::info!("Initializing leptess engine...");
            Ok(Box::new(leptess::LeptessEngine::new(config)?))
        }
        other => Err(OcrError::UnknownEngine(format!(
            "{} (available: {})",
            other,
            available().join(", ")
        ))),
    }
}

/// Parse Tesseract's TSV output into word detections.
///
/// Columns: level page_num block_num par_num line_num word_num left top
/// width height conf text. Only word-level rows are kept; an unparsable
/// confidence becomes -1 (unknown). Filtering is left to the caller.
pub fn parse_tsv(tsv: &str) -> Vec<WordDetection> {
    let mut words = Vec::new();

    for (idx, row) in tsv.lines().enumerate() {
        if idx == 0 && row.starts_with("level") {
            continue;
        }
        let cols: Vec<&str> = row.split('\t').collect();
        if cols.len() < 11 || cols[0] != WORD_LEVEL {
            continue;
        }

        let int = |i: usize| cols[i].trim().parse::<i32>().unwrap_or(0);
        let confidence = cols[10].trim().parse::<f32>().unwrap_or(-1.0);
        let text = cols.get(11).copied().unwrap_or("");

        words.push(WordDetection::new(
            text,
            confidence,
            BoundingBox::new(int(6), int(7), int(8), int(9)),
        ));
    }

    words
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
1\t1\t0\t0\t0\t0\t0\t0\t800\t200\t-1\t
4\t1\t1\t1\t1\t0\t20\t30\t400\t40\t-1\t
5\t1\t1\t1\t1\t1\t20\t30\t120\t40\t96.52\tHello
5\t1\t1\t1\t1\t2\t160\t30\t140\t40\t91\tWorld
5\t1\t1\t1\t1\t3\t320\t30\t10\t40\tabc\t|
5\t1\t1\t1\t1\t4\t340\t30\t10\t40\t50";

    #[test]
    fn test_parse_tsv_keeps_word_rows() {
        let words = parse_tsv(SAMPLE);

        assert_eq!(words.len(), 4);
        assert_eq!(words[0].text, "Hello");
        assert!((words[0].confidence - 96.52).abs() < 1e-4);
        assert_eq!(words[0].bbox, BoundingBox::new(20, 30, 120, 40));
        assert_eq!(words[1].text, "World");
        assert_eq!(words[2].confidence, -1.0);
        // Missing text column yields an empty word, dropped later by the filter
        assert_eq!(words[3].text, "");
    }

    #[test]
    fn test_parse_tsv_handles_empty_output() {
        assert!(parse_tsv("").is_empty());
        assert!(parse_tsv("level\tpage_num").is_empty());
    }

    #[test]
    fn test_unknown_engine_is_rejected() {
        let mut config = Config::default();
        config.engine = "nonexistent".to_string();
        assert!(matches!(build(&config), Err(OcrError::UnknownEngine(_))));
    }
}
