//! Image preprocessing module for OCR enhancement
//!
//! Provides the fixed catalog of preprocessing pipelines the selector tries.

pub mod pipeline;
pub mod steps;

pub use pipeline::{default_catalog, PipelineDescriptor, Transform, CATALOG};
