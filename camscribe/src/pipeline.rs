use std::path::Path;
use std::sync::Arc;

use image::RgbImage;
use tracing::{debug, info, warn};

use crate::capture::CropRegion;
use crate::config::{Config, PreprocessConfig};
use crate::db::ScanStore;
use crate::error::Result;
use crate::gate::QualityGate;
use crate::models::{RecognitionResult, ScanRecord};
use crate::narrator::Narrator;
use crate::ocr::{normalize_text, preprocess_crop, TextRecognizer};

const ORIGINAL_ARTIFACT: &str = "captured_original.jpg";
const CROP_ARTIFACT: &str = "captured_crop.jpg";
const RULE_WIDTH: usize = 60;

/// How a scan ended when nothing went wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Text passed the gate and was stored under `id`.
    Saved { id: String, result: RecognitionResult },
    /// Text was too short to keep; nothing was stored.
    Rejected { result: RecognitionResult },
}

/// Everything that happens after the scan key is pressed, run to completion.
pub struct ScanPipeline {
    recognizer: Box<dyn TextRecognizer>,
    store: Arc<dyn ScanStore>,
    narrator: Option<Box<dyn Narrator>>,
    gate: QualityGate,
    preprocess: PreprocessConfig,
    normalize: bool,
    include_length: bool,
    debug_artifacts_dir: Option<std::path::PathBuf>,
}

impl ScanPipeline {
    pub fn new(
        config: &Config,
        recognizer: Box<dyn TextRecognizer>,
        store: Arc<dyn ScanStore>,
    ) -> Self {
        Self {
            recognizer,
            store,
            narrator: None,
            gate: QualityGate::new(config.scan.min_length),
            preprocess: config.preprocess.clone(),
            normalize: config.scan.normalize,
            include_length: config.store.include_length,
            debug_artifacts_dir: config.scan.debug_artifacts_dir.clone(),
        }
    }

    /// Read accepted text aloud after it is stored.
    pub fn with_narrator(mut self, narrator: Box<dyn Narrator>) -> Self {
        self.narrator = Some(narrator);
        self
    }

    pub async fn scan(&mut self, frame: &RgbImage, region: CropRegion) -> Result<ScanOutcome> {
        println!("\nScanning...");

        let crop = region.crop(frame);
        if let Some(dir) = &self.debug_artifacts_dir {
            write_debug_artifacts(dir, frame, &crop);
        }

        let binary = preprocess_crop(&crop, &self.preprocess);
        debug!(
            width = binary.width(),
            height = binary.height(),
            "Crop preprocessed"
        );

        let raw = self.recognizer.recognize(&binary)?;
        let text = if self.normalize {
            normalize_text(&raw)
        } else {
            raw
        };
        let result = RecognitionResult::new(text);

        println!("\nExtracted Text:\n");
        println!("{}", result.text());
        println!("{}", "-".repeat(RULE_WIDTH));

        if !self.gate.accepts(result.text()) {
            if self.gate.min_length() == 0 {
                println!("No text detected. Not saving.");
            } else {
                println!("Text too short / unclear. Not saving.");
            }
            info!(
                length = result.length(),
                min_length = self.gate.min_length(),
                "Scan rejected"
            );
            return Ok(ScanOutcome::Rejected { result });
        }

        let record = ScanRecord::new(&result, self.include_length);
        let id = self.store.insert_scan(&record).await?;
        println!("Saved to {} with ID: {}", self.store.backend_name(), id);
        info!(%id, length = result.length(), "Scan saved");

        if let Some(narrator) = &self.narrator {
            println!("Reading text aloud...");
            narrator.speak(result.text());
        }

        Ok(ScanOutcome::Saved { id, result })
    }
}

/// Overwrite the full-frame and crop snapshots in `dir`. Failures are only
/// logged.
fn write_debug_artifacts(dir: &Path, frame: &RgbImage, crop: &RgbImage) {
    for (name, image) in [(ORIGINAL_ARTIFACT, frame), (CROP_ARTIFACT, crop)] {
        let path = dir.join(name);
        if let Err(e) = image.save(&path) {
            warn!(path = %path.display(), "Failed to write debug image: {}", e);
        }
    }
}
