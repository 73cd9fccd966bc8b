//! Frame acquisition.
//!
//! `FrameSource` is the seam between the interaction loop and the camera
//! driver, so the loop can be driven from recorded frames in tests.

mod camera;
mod crop;

pub use camera::CameraSource;
pub use crop::CropRegion;

use image::RgbImage;

use crate::error::Result;

pub trait FrameSource {
    /// Block until the next frame is available.
    ///
    /// `ScanError::FrameRead` means the stream produced no usable data; the
    /// caller ends the session rather than retrying.
    fn next_frame(&mut self) -> Result<RgbImage>;

    /// Stop the stream and hand the device back. Must be safe to call twice.
    fn release(&mut self);
}
