//! OCR (Optical Character Recognition) Module
//!
//! Turns the cropped region of a camera frame into text.
//!
//! # Architecture
//!
//! - `preprocess_crop` binarizes the crop (grayscale, denoise, upscale, threshold)
//! - `TextRecognizer` is the engine interface; `OcrProvider` implements it with
//!   Tesseract via leptess
//! - `normalize_text` optionally strips non-ASCII noise from the engine output
//!
//! # Configuration
//!
//! Preprocessing is controlled by `PreprocessConfig` and the engine by
//! `OcrConfig` (see `config.rs`):
//! - `denoise` / `threshold`: `contrast-stretch` + `otsu`, or `bilateral` +
//!   `adaptive-mean`, or any mix
//! - `languages`: Tesseract language codes, `eng` by default
//! - `page_seg_mode`: 3 (automatic page) or 4 (single column)
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut ocr = OcrProvider::new(&config.ocr)?;
//! let binary = preprocess_crop(&crop, &config.preprocess);
//! let text = normalize_text(&ocr.recognize(&binary)?);
//! ```

mod normalize;
mod preprocessing;
mod provider;

pub use normalize::normalize_text;
pub use preprocessing::{encode_png, preprocess_crop};
pub use provider::{OcrProvider, TextRecognizer};
