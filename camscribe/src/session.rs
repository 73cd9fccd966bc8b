use image::Rgb;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::capture::{CropRegion, FrameSource};
use crate::display::{KeyAction, PreviewDisplay};
use crate::error::{Result, ScanError};
use crate::pipeline::{ScanOutcome, ScanPipeline};

const GUIDE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const GUIDE_THICKNESS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    Terminated,
}

/// Counters reported when a session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub frames: usize,
    pub saved: usize,
    pub rejected: usize,
    /// The session ended because the interrupt token was cancelled.
    pub interrupted: bool,
}

/// The interactive capture loop: preview, wait for a key, scan on demand.
///
/// The frame source and display are released when the session finishes,
/// whichever way it finishes, and again on drop.
pub struct ScanSession<S: FrameSource, D: PreviewDisplay> {
    source: S,
    display: D,
    pipeline: ScanPipeline,
    margin: f64,
    state: SessionState,
    summary: SessionSummary,
    interrupt: CancellationToken,
    released: bool,
}

impl<S: FrameSource, D: PreviewDisplay> ScanSession<S, D> {
    /// Open the frame source and build a session around it.
    ///
    /// If opening fails the pipeline is dropped untouched and the error is
    /// returned, so no scan, store or narrator work can happen.
    pub fn start<F>(open_source: F, display: D, pipeline: ScanPipeline, margin: f64) -> Result<Self>
    where
        F: FnOnce() -> Result<S>,
    {
        let source = open_source()?;
        Ok(Self {
            source,
            display,
            pipeline,
            margin,
            state: SessionState::Running,
            summary: SessionSummary::default(),
            interrupt: CancellationToken::new(),
            released: false,
        })
    }

    /// End the session at the start of the next cycle once `token` is
    /// cancelled. A scan already running is finished first.
    pub fn with_interrupt(mut self, token: CancellationToken) -> Self {
        self.interrupt = token;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run until quit, window close, interrupt, or a frame read failure.
    ///
    /// A scan error also ends the session; it is logged and returned after
    /// cleanup.
    pub async fn run(mut self) -> Result<SessionSummary> {
        println!("Press 's' to scan text");
        println!("Press 'q' to quit");

        let result = loop {
            match self.step().await {
                // let the runtime deliver signals between frames
                Ok(SessionState::Running) => tokio::task::yield_now().await,
                Ok(SessionState::Terminated) => break Ok(self.summary),
                Err(e) => {
                    error!("Session aborted: {}", e);
                    break Err(e);
                }
            }
        };

        self.shutdown();
        result
    }

    /// One iteration of the loop. Returns the state after the iteration.
    pub async fn step(&mut self) -> Result<SessionState> {
        if self.state == SessionState::Terminated {
            return Ok(self.state);
        }
        if self.interrupt.is_cancelled() {
            println!("\nInterrupted by user.");
            info!("Session interrupted");
            self.summary.interrupted = true;
            return Ok(self.terminate());
        }

        let frame = match self.source.next_frame() {
            Ok(frame) => frame,
            Err(ScanError::FrameRead(reason)) => {
                warn!("Failed to grab frame: {}", reason);
                return Ok(self.terminate());
            }
            Err(e) => {
                self.terminate();
                return Err(e);
            }
        };
        self.summary.frames += 1;

        let region = CropRegion::centered(frame.width(), frame.height(), self.margin);
        let mut preview = frame.clone();
        region.draw_guide(&mut preview, GUIDE_COLOR, GUIDE_THICKNESS);

        if let Err(e) = self.display.present(&preview) {
            self.terminate();
            return Err(e);
        }
        if !self.display.is_open() {
            info!("Preview window closed");
            return Ok(self.terminate());
        }

        match self.display.poll_action() {
            Some(KeyAction::Scan) => match self.pipeline.scan(&frame, region).await {
                Ok(ScanOutcome::Saved { .. }) => self.summary.saved += 1,
                Ok(ScanOutcome::Rejected { .. }) => self.summary.rejected += 1,
                Err(e) => {
                    self.terminate();
                    return Err(e);
                }
            },
            Some(KeyAction::Quit) => return Ok(self.terminate()),
            None => {}
        }

        Ok(self.state)
    }

    fn terminate(&mut self) -> SessionState {
        self.state = SessionState::Terminated;
        self.state
    }

    fn shutdown(&mut self) {
        self.state = SessionState::Terminated;
        if self.released {
            return;
        }
        self.released = true;
        self.source.release();
        self.display.close();
    }
}

impl<S: FrameSource, D: PreviewDisplay> Drop for ScanSession<S, D> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
