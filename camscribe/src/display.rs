//! Live preview window and keyboard handling.

use image::RgbImage;
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use tracing::debug;

use crate::error::{Result, ScanError};

/// What a key press asks the session to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Scan,
    Quit,
}

/// Map a pressed key to an action; every other key is ignored.
pub fn key_action(key: Key) -> Option<KeyAction> {
    match key {
        Key::S => Some(KeyAction::Scan),
        Key::Q | Key::Escape => Some(KeyAction::Quit),
        _ => None,
    }
}

pub trait PreviewDisplay {
    /// Show `frame` and pump window events.
    fn present(&mut self, frame: &RgbImage) -> Result<()>;

    /// Key pressed since the last call, if it maps to an action. Never blocks.
    fn poll_action(&mut self) -> Option<KeyAction>;

    /// False once the user has closed the window.
    fn is_open(&self) -> bool;

    /// Tear down the window. Must be safe to call twice.
    fn close(&mut self);
}

/// Pack RGB pixels into minifb's `0RGB` u32 layout.
pub fn to_argb_buffer(frame: &RgbImage) -> Vec<u32> {
    frame
        .pixels()
        .map(|p| ((p[0] as u32) << 16) | ((p[1] as u32) << 8) | p[2] as u32)
        .collect()
}

/// Preview window backed by minifb, created on the first frame so it can
/// match the granted camera resolution.
pub struct MinifbDisplay {
    title: String,
    window: Option<Window>,
    closed: bool,
}

impl MinifbDisplay {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            window: None,
            closed: false,
        }
    }

    fn window_for(&mut self, width: usize, height: usize) -> Result<&mut Window> {
        if self.window.is_none() {
            let mut window = Window::new(&self.title, width, height, WindowOptions::default())
                .map_err(|e| ScanError::Display(e.to_string()))?;
            // no frame pacing; the camera read already blocks
            window.set_target_fps(0);
            debug!(width, height, "Preview window opened");
            self.window = Some(window);
        }
        self.window
            .as_mut()
            .ok_or_else(|| ScanError::Display("preview window missing".to_string()))
    }
}

impl PreviewDisplay for MinifbDisplay {
    fn present(&mut self, frame: &RgbImage) -> Result<()> {
        if self.closed {
            return Err(ScanError::Display("preview window closed".to_string()));
        }
        let (width, height) = (frame.width() as usize, frame.height() as usize);
        let buffer = to_argb_buffer(frame);

        self.window_for(width, height)?
            .update_with_buffer(&buffer, width, height)
            .map_err(|e| ScanError::Display(e.to_string()))
    }

    fn poll_action(&mut self) -> Option<KeyAction> {
        let window = self.window.as_ref()?;
        window
            .get_keys_pressed(KeyRepeat::No)
            .into_iter()
            .find_map(key_action)
    }

    fn is_open(&self) -> bool {
        !self.closed && self.window.as_ref().map_or(true, Window::is_open)
    }

    fn close(&mut self) {
        if self.window.take().is_some() {
            debug!("Preview window closed");
        }
        self.closed = true;
    }
}
