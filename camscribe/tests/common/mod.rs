// Fakes for driving a scan session without a camera or a window
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use image::{GrayImage, Rgb, RgbImage};

use camscribe::capture::FrameSource;
use camscribe::display::{KeyAction, PreviewDisplay};
use camscribe::error::{Result, ScanError};
use camscribe::models::ScanRecord;
use camscribe::narrator::Narrator;
use camscribe::ocr::TextRecognizer;
use camscribe::db::ScanStore;

static INIT: Once = Once::new();

/// Initialize tracing subscriber once for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

pub const FRAME_WIDTH: u32 = 160;
pub const FRAME_HEIGHT: u32 = 120;

pub fn gray_frame() -> RgbImage {
    RgbImage::from_pixel(FRAME_WIDTH, FRAME_HEIGHT, Rgb([180, 180, 180]))
}

/// What the fakes saw, shared with the test after the session consumes them.
#[derive(Debug, Default)]
pub struct Probe {
    pub frames_served: usize,
    pub presented: Vec<RgbImage>,
    pub source_released: usize,
    pub display_closed: usize,
}

pub type SharedProbe = Rc<RefCell<Probe>>;

pub fn probe() -> SharedProbe {
    Rc::new(RefCell::new(Probe::default()))
}

/// Serves `frames` identical frames, then reports a read failure.
pub struct RecordedSource {
    remaining: usize,
    probe: SharedProbe,
}

impl RecordedSource {
    pub fn new(frames: usize, probe: SharedProbe) -> Self {
        Self {
            remaining: frames,
            probe,
        }
    }
}

impl FrameSource for RecordedSource {
    fn next_frame(&mut self) -> Result<RgbImage> {
        if self.remaining == 0 {
            return Err(ScanError::FrameRead("end of recording".to_string()));
        }
        self.remaining -= 1;
        self.probe.borrow_mut().frames_served += 1;
        Ok(gray_frame())
    }

    fn release(&mut self) {
        self.probe.borrow_mut().source_released += 1;
    }
}

/// One entry per presented frame: the key pressed while it was on screen.
pub struct ScriptedDisplay {
    keys: VecDeque<Option<KeyAction>>,
    pending: Option<KeyAction>,
    close_window_after: Option<usize>,
    probe: SharedProbe,
}

impl ScriptedDisplay {
    pub fn new(keys: Vec<Option<KeyAction>>, probe: SharedProbe) -> Self {
        Self {
            keys: keys.into(),
            pending: None,
            close_window_after: None,
            probe,
        }
    }

    /// Simulate the user closing the window once `frames` have been shown.
    pub fn closing_after(mut self, frames: usize) -> Self {
        self.close_window_after = Some(frames);
        self
    }
}

impl PreviewDisplay for ScriptedDisplay {
    fn present(&mut self, frame: &RgbImage) -> Result<()> {
        self.probe.borrow_mut().presented.push(frame.clone());
        self.pending = self.keys.pop_front().flatten();
        Ok(())
    }

    fn poll_action(&mut self) -> Option<KeyAction> {
        self.pending.take()
    }

    fn is_open(&self) -> bool {
        let shown = self.probe.borrow().presented.len();
        self.close_window_after.map_or(true, |limit| shown < limit)
    }

    fn close(&mut self) {
        self.probe.borrow_mut().display_closed += 1;
    }
}

/// Returns the same text for every image and counts calls.
pub struct FixedText {
    text: String,
    calls: Arc<AtomicUsize>,
}

impl FixedText {
    pub fn new(text: &str) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                text: text.to_string(),
                calls: calls.clone(),
            },
            calls,
        )
    }
}

impl TextRecognizer for FixedText {
    fn recognize(&mut self, _image: &GrayImage) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone())
    }
}

pub struct BrokenRecognizer;

impl TextRecognizer for BrokenRecognizer {
    fn recognize(&mut self, _image: &GrayImage) -> Result<String> {
        Err(ScanError::Ocr("engine crashed".to_string()))
    }
}

/// In-memory store that keeps every inserted record.
#[derive(Default)]
pub struct RecordingStore {
    pub records: Mutex<Vec<ScanRecord>>,
}

impl RecordingStore {
    pub fn count(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl ScanStore for RecordingStore {
    async fn insert_scan(&self, record: &ScanRecord) -> Result<String> {
        let mut records = self.records.lock().unwrap();
        records.push(record.clone());
        Ok(format!("scan-{}", records.len()))
    }

    fn backend_name(&self) -> &'static str {
        "recording"
    }
}

#[derive(Clone, Default)]
pub struct SpokenLog(pub Arc<Mutex<Vec<String>>>);

impl Narrator for SpokenLog {
    fn speak(&self, text: &str) {
        self.0.lock().unwrap().push(text.to_string());
    }
}
