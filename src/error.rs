use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("Failed to initialize OCR engine: {0}")]
    InitializationError(String),

    #[error("Failed to process image: {0}")]
    ProcessingError(String),

    #[error("Preprocessing failed: {0}")]
    PreprocessingError(String),

    #[error("Invalid input image: {0}")]
    InvalidImage(String),

    #[error("Pipeline catalog is empty")]
    EmptyCatalog,

    #[error("Unknown OCR engine: {0}")]
    UnknownEngine(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
