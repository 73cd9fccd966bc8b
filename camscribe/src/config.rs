use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Result, ScanError};

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

/// Like `parse_env_or`, but an empty value clears the setting.
fn parse_env_path(var: &str, default: Option<PathBuf>) -> Option<PathBuf> {
    match env::var(var) {
        Ok(val) if val.trim().is_empty() => None,
        Ok(val) => Some(PathBuf::from(val)),
        Err(_) => default,
    }
}

/// Noise reduction applied to the grayscale crop before upscaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenoiseMethod {
    /// Linear contrast stretch followed by a median blur.
    ContrastStretch,
    /// Edge-preserving bilateral smoothing.
    Bilateral,
}

impl FromStr for DenoiseMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "contrast-stretch" | "contrast" | "median" => Ok(Self::ContrastStretch),
            "bilateral" => Ok(Self::Bilateral),
            other => Err(format!(
                "unknown denoise method '{other}' (expected contrast-stretch or bilateral)"
            )),
        }
    }
}

impl fmt::Display for DenoiseMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContrastStretch => write!(f, "contrast-stretch"),
            Self::Bilateral => write!(f, "bilateral"),
        }
    }
}

/// Binarization policy for the upscaled crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdMethod {
    /// Single global level chosen with Otsu's method.
    Otsu,
    /// Per-pixel level from the mean of the surrounding block.
    AdaptiveMean,
}

impl FromStr for ThresholdMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "otsu" => Ok(Self::Otsu),
            "adaptive-mean" | "adaptive" => Ok(Self::AdaptiveMean),
            other => Err(format!(
                "unknown threshold method '{other}' (expected otsu or adaptive-mean)"
            )),
        }
    }
}

impl fmt::Display for ThresholdMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Otsu => write!(f, "otsu"),
            Self::AdaptiveMean => write!(f, "adaptive-mean"),
        }
    }
}

/// Named starting points for the configuration. Environment variables are
/// applied on top of whichever preset is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Preset {
    /// Contrast stretch + Otsu, cleaned text, records carry a length.
    #[default]
    Document,
    /// Bilateral + adaptive mean, raw text, any non-empty result is kept.
    Adaptive,
    /// Same as `document`, and accepted text is read aloud.
    Narrated,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub camera: CameraConfig,
    pub crop: CropConfig,
    pub preprocess: PreprocessConfig,
    pub ocr: OcrConfig,
    pub scan: ScanConfig,
    pub store: StoreConfig,
    pub narrator: NarratorConfig,
}

#[derive(Debug, Clone)]
pub struct CameraConfig {
    pub index: u32,
    pub width: u32,
    pub height: u32,
    pub window_title: String,
}

#[derive(Debug, Clone)]
pub struct CropConfig {
    /// Fraction of each dimension left outside the crop on every side.
    pub margin: f64,
}

#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    pub denoise: DenoiseMethod,
    pub threshold: ThresholdMethod,
    pub upscale_factor: u32,
    pub contrast_gain: f32,
    pub contrast_bias: f32,
    pub median_kernel: u32,
    pub bilateral_diameter: u32,
    pub bilateral_sigma_color: f32,
    pub bilateral_sigma_space: f32,
    pub adaptive_block_size: u32,
    pub adaptive_offset: i32,
}

#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub languages: String,
    pub data_path: Option<String>,
    /// Tesseract page segmentation mode, 3 (automatic) or 4 (single column).
    pub page_seg_mode: u32,
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub normalize: bool,
    /// Results whose trimmed length is not above this are discarded.
    pub min_length: usize,
    pub speak: bool,
    pub debug_artifacts_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub url: String,
    pub database: String,
    pub collection: String,
    pub include_length: bool,
}

#[derive(Debug, Clone)]
pub struct NarratorConfig {
    pub command: String,
    pub max_chars: usize,
}

fn default_narrator_command() -> &'static str {
    if cfg!(target_os = "macos") {
        "say"
    } else {
        "espeak"
    }
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            denoise: DenoiseMethod::ContrastStretch,
            threshold: ThresholdMethod::Otsu,
            upscale_factor: 2,
            contrast_gain: 1.6,
            contrast_bias: 20.0,
            median_kernel: 3,
            bilateral_diameter: 9,
            bilateral_sigma_color: 75.0,
            bilateral_sigma_space: 75.0,
            adaptive_block_size: 15,
            adaptive_offset: 10,
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            languages: "eng".to_string(),
            data_path: None,
            page_seg_mode: 3,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "mongodb://localhost:27017/".to_string(),
            database: "ocr_database".to_string(),
            collection: "scanned_texts".to_string(),
            include_length: true,
        }
    }
}

impl Default for NarratorConfig {
    fn default() -> Self {
        Self {
            command: default_narrator_command().to_string(),
            max_chars: 1000,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::preset(Preset::Document)
    }
}

impl Config {
    /// Built-in values for a preset, without looking at the environment.
    pub fn preset(preset: Preset) -> Self {
        let camera = CameraConfig {
            index: 0,
            width: 1280,
            height: 720,
            window_title: "Camera - OCR Scanner".to_string(),
        };

        match preset {
            Preset::Document | Preset::Narrated => Self {
                camera,
                crop: CropConfig { margin: 0.15 },
                preprocess: PreprocessConfig::default(),
                ocr: OcrConfig::default(),
                scan: ScanConfig {
                    normalize: true,
                    min_length: 20,
                    speak: preset == Preset::Narrated,
                    debug_artifacts_dir: (preset == Preset::Document).then(|| PathBuf::from(".")),
                },
                store: StoreConfig::default(),
                narrator: NarratorConfig::default(),
            },
            Preset::Adaptive => Self {
                camera,
                crop: CropConfig { margin: 0.2 },
                preprocess: PreprocessConfig {
                    denoise: DenoiseMethod::Bilateral,
                    threshold: ThresholdMethod::AdaptiveMean,
                    ..PreprocessConfig::default()
                },
                ocr: OcrConfig {
                    page_seg_mode: 4,
                    ..OcrConfig::default()
                },
                scan: ScanConfig {
                    normalize: false,
                    min_length: 0,
                    speak: false,
                    debug_artifacts_dir: None,
                },
                store: StoreConfig {
                    include_length: false,
                    ..StoreConfig::default()
                },
                narrator: NarratorConfig::default(),
            },
        }
    }

    pub fn from_env() -> Self {
        Self::from_env_with_preset(Preset::default())
    }

    /// Start from `preset` and let environment variables override any field.
    pub fn from_env_with_preset(preset: Preset) -> Self {
        let base = Self::preset(preset);

        Self {
            camera: CameraConfig {
                index: parse_env_or("CAMERA_INDEX", base.camera.index),
                width: parse_env_or("CAMERA_WIDTH", base.camera.width),
                height: parse_env_or("CAMERA_HEIGHT", base.camera.height),
                window_title: env::var("WINDOW_TITLE").unwrap_or(base.camera.window_title),
            },
            crop: CropConfig {
                margin: parse_env_or("CROP_MARGIN", base.crop.margin),
            },
            preprocess: PreprocessConfig {
                denoise: parse_env_or("DENOISE_METHOD", base.preprocess.denoise),
                threshold: parse_env_or("THRESHOLD_METHOD", base.preprocess.threshold),
                upscale_factor: parse_env_or("UPSCALE_FACTOR", base.preprocess.upscale_factor),
                ..base.preprocess
            },
            ocr: OcrConfig {
                languages: env::var("OCR_LANGUAGES").unwrap_or(base.ocr.languages),
                data_path: env::var("OCR_DATA_PATH").ok().or(base.ocr.data_path),
                page_seg_mode: parse_env_or("OCR_PSM", base.ocr.page_seg_mode),
            },
            scan: ScanConfig {
                normalize: parse_env_or("NORMALIZE_TEXT", base.scan.normalize),
                min_length: parse_env_or("MIN_TEXT_LENGTH", base.scan.min_length),
                speak: parse_env_or("SPEAK_TEXT", base.scan.speak),
                debug_artifacts_dir: parse_env_path(
                    "DEBUG_ARTIFACTS_DIR",
                    base.scan.debug_artifacts_dir,
                ),
            },
            store: StoreConfig {
                url: env::var("STORE_URL").unwrap_or(base.store.url),
                database: env::var("STORE_DATABASE").unwrap_or(base.store.database),
                collection: env::var("STORE_COLLECTION").unwrap_or(base.store.collection),
                include_length: parse_env_or("STORE_INCLUDE_LENGTH", base.store.include_length),
            },
            narrator: NarratorConfig {
                command: env::var("NARRATOR_COMMAND").unwrap_or(base.narrator.command),
                max_chars: parse_env_or("NARRATOR_MAX_CHARS", base.narrator.max_chars),
            },
        }
    }

    /// Reject settings the pipeline cannot honour.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..0.5).contains(&self.crop.margin) {
            return Err(ScanError::Config(format!(
                "crop margin must be in [0, 0.5), got {}",
                self.crop.margin
            )));
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(ScanError::Config(format!(
                "camera resolution must be non-zero, got {}x{}",
                self.camera.width, self.camera.height
            )));
        }
        if self.preprocess.upscale_factor == 0 {
            return Err(ScanError::Config(
                "upscale factor must be at least 1".to_string(),
            ));
        }
        let block = self.preprocess.adaptive_block_size;
        if block < 3 || block % 2 == 0 {
            return Err(ScanError::Config(format!(
                "adaptive block size must be odd and at least 3, got {block}"
            )));
        }
        if !matches!(self.ocr.page_seg_mode, 3 | 4) {
            return Err(ScanError::Config(format!(
                "page segmentation mode must be 3 or 4, got {}",
                self.ocr.page_seg_mode
            )));
        }
        if self.scan.speak && self.narrator.command.trim().is_empty() {
            return Err(ScanError::Config(
                "speech is enabled but NARRATOR_COMMAND is empty".to_string(),
            ));
        }
        Ok(())
    }
}
