use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Camera unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Frame read failed: {0}")]
    FrameRead(String),

    #[error("Display error: {0}")]
    Display(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("OCR error: {0}")]
    Ocr(String),

    #[error("OCR unavailable: {0}")]
    OcrUnavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] libsql::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;
