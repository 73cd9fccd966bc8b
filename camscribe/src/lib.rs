//! Webcam text scanner: preview a camera feed, press a key, and store what
//! Tesseract reads inside the scan guide.

pub mod capture;
pub mod config;
pub mod db;
pub mod display;
pub mod error;
pub mod gate;
pub mod models;
pub mod narrator;
pub mod ocr;
pub mod pipeline;
pub mod session;
