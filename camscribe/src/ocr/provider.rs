use image::GrayImage;
use leptess::{LepTess, Variable};
use tracing::{debug, info, warn};

use crate::config::OcrConfig;
use crate::error::{Result, ScanError};

use super::preprocessing::encode_png;

/// Anything that can turn a binarized image into text.
pub trait TextRecognizer {
    fn recognize(&mut self, image: &GrayImage) -> Result<String>;
}

enum OcrBackend {
    Local { tesseract: LepTess },
    Unavailable { reason: String },
}

/// Tesseract, driven through leptess with the default (LSTM) engine.
pub struct OcrProvider {
    backend: OcrBackend,
    config: OcrConfig,
}

fn create_tesseract(config: &OcrConfig) -> std::result::Result<LepTess, String> {
    let mut lt = LepTess::new(config.data_path.as_deref(), &config.languages)
        .map_err(|e| e.to_string())?;
    lt.set_variable(
        Variable::TesseditPagesegMode,
        &config.page_seg_mode.to_string(),
    )
    .map_err(|e| format!("failed to set page segmentation mode: {e:?}"))?;
    Ok(lt)
}

impl OcrProvider {
    pub fn new(config: &OcrConfig) -> Result<Self> {
        let backend = match create_tesseract(config) {
            Ok(tesseract) => {
                info!(
                    languages = %config.languages,
                    psm = config.page_seg_mode,
                    "Tesseract OCR initialized"
                );
                OcrBackend::Local { tesseract }
            }
            Err(e) => {
                let reason = format!("Tesseract not available: {e}");
                warn!("{}", reason);
                OcrBackend::Unavailable { reason }
            }
        };

        Ok(Self {
            backend,
            config: config.clone(),
        })
    }

    pub fn is_available(&self) -> bool {
        !matches!(self.backend, OcrBackend::Unavailable { .. })
    }

    pub fn languages(&self) -> &str {
        &self.config.languages
    }
}

impl TextRecognizer for OcrProvider {
    fn recognize(&mut self, image: &GrayImage) -> Result<String> {
        match &mut self.backend {
            OcrBackend::Local { tesseract } => {
                let png = encode_png(image)?;
                tesseract
                    .set_image_from_mem(&png)
                    .map_err(|e| ScanError::Ocr(format!("Failed to set image: {e}")))?;
                let text = tesseract
                    .get_utf8_text()
                    .map_err(|e| ScanError::Ocr(format!("Failed to extract text: {e}")))?;
                debug!(chars = text.chars().count(), "Tesseract returned text");
                Ok(text)
            }
            OcrBackend::Unavailable { reason } => Err(ScanError::OcrUnavailable(reason.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config(languages: &str) -> OcrConfig {
        OcrConfig {
            languages: languages.to_string(),
            data_path: None,
            page_seg_mode: 3,
        }
    }

    #[test]
    fn test_ocr_provider_graceful_degradation() {
        let result = OcrProvider::new(&make_config("eng"));
        assert!(result.is_ok());
    }

    #[test]
    fn test_missing_language_data_is_unavailable() {
        let provider = OcrProvider::new(&OcrConfig {
            data_path: Some("/nonexistent/tessdata".to_string()),
            ..make_config("zzz")
        })
        .unwrap();
        assert!(!provider.is_available());
        assert_eq!(provider.languages(), "zzz");
    }

    #[test]
    fn test_unavailable_backend_returns_error() {
        let mut provider = OcrProvider {
            backend: OcrBackend::Unavailable {
                reason: "Test unavailable".to_string(),
            },
            config: make_config("eng"),
        };

        let result = provider.recognize(&GrayImage::new(10, 10));
        assert!(matches!(result, Err(ScanError::OcrUnavailable(_))));
    }
}
