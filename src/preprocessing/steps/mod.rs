//! Individual preprocessing steps

pub mod denoise;
pub mod deskew;
pub mod grayscale;
pub mod morphology;
pub mod polarity;
pub mod resize;
pub mod table_lines;
pub mod threshold;
