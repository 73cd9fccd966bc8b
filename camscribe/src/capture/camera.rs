use image::RgbImage;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
};
use nokhwa::Camera;
use tracing::{debug, info, warn};

use crate::config::CameraConfig;
use crate::error::{Result, ScanError};

use super::FrameSource;

const REQUESTED_FPS: u32 = 30;

/// Default system video input, opened through nokhwa.
pub struct CameraSource {
    camera: Option<Camera>,
}

impl CameraSource {
    /// Open the device and start streaming.
    ///
    /// The requested resolution is a hint; the driver picks the closest
    /// format it supports and the granted size is logged.
    pub fn open(config: &CameraConfig) -> Result<Self> {
        let format = CameraFormat::new(
            Resolution::new(config.width, config.height),
            FrameFormat::MJPEG,
            REQUESTED_FPS,
        );
        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(format));

        let mut camera = Camera::new(CameraIndex::Index(config.index), requested).map_err(|e| {
            ScanError::DeviceUnavailable(format!(
                "could not open camera {}: {e}. Make sure camera permissions are granted.",
                config.index
            ))
        })?;

        camera.open_stream().map_err(|e| {
            ScanError::DeviceUnavailable(format!(
                "could not start stream on camera {}: {e}",
                config.index
            ))
        })?;

        let granted = camera.resolution();
        if granted.width() != config.width || granted.height() != config.height {
            warn!(
                requested_width = config.width,
                requested_height = config.height,
                width = granted.width(),
                height = granted.height(),
                "Camera did not grant the requested resolution"
            );
        } else {
            info!(
                width = granted.width(),
                height = granted.height(),
                "Camera stream opened"
            );
        }

        Ok(Self {
            camera: Some(camera),
        })
    }
}

impl FrameSource for CameraSource {
    fn next_frame(&mut self) -> Result<RgbImage> {
        let camera = self
            .camera
            .as_mut()
            .ok_or_else(|| ScanError::FrameRead("camera already released".to_string()))?;

        let buffer = camera
            .frame()
            .map_err(|e| ScanError::FrameRead(e.to_string()))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| ScanError::FrameRead(format!("failed to decode frame: {e}")))?;

        let (width, height) = (decoded.width(), decoded.height());
        RgbImage::from_raw(width, height, decoded.into_raw()).ok_or_else(|| {
            ScanError::FrameRead(format!("frame buffer does not match {width}x{height}"))
        })
    }

    fn release(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            if let Err(e) = camera.stop_stream() {
                warn!("Failed to stop camera stream: {}", e);
            }
            debug!("Camera released");
        }
    }
}

impl Drop for CameraSource {
    fn drop(&mut self) {
        self.release();
    }
}
