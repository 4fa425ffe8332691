//! Automatic preprocessing-pipeline selection for OCR.
//!
//! Each image is run through a fixed catalog of enhancement pipelines, every
//! result is recognized and scored, and the best one is returned together
//! with a reliability verdict.

pub mod config;
pub mod engine;
pub mod engines;
pub mod error;
pub mod preprocessing;
pub mod runner;
pub mod scoring;
pub mod selector;
pub mod visualize;

pub use engine::{BoundingBox, SegmentationMode, WordDetection, WordDetector};
pub use error::OcrError;
pub use preprocessing::{default_catalog, PipelineDescriptor, Transform};
pub use selector::{SelectionOutcome, Selector, Thresholds, UNRELIABLE_SUFFIX};
