use std::sync::Arc;

use parking_lot::Mutex;

use super::WindowBackend;
use crate::config::WindowMode;
use crate::error::{ShellError, ShellResult};

/// One call received by a [`RecordingWindow`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowCall {
    SetTitle(String),
    SetSize(u32, u32),
    SetWindowMode(WindowMode),
    RenderFrame,
    Destroy,
}

/// Window backend that only records what it was asked to do
pub struct RecordingWindow {
    calls: Arc<Mutex<Vec<WindowCall>>>,
    fail_frames: bool,
}

/// Read side of a [`RecordingWindow`]'s call log
#[derive(Clone)]
pub struct WindowLog {
    calls: Arc<Mutex<Vec<WindowCall>>>,
}

impl RecordingWindow {
    pub fn new() -> (Self, WindowLog) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                calls: calls.clone(),
                fail_frames: false,
            },
            WindowLog { calls },
        )
    }

    /// Every `render_frame` still gets recorded, then fails
    pub fn failing_frames(mut self) -> Self {
        self.fail_frames = true;
        self
    }

    fn record(&self, call: WindowCall) {
        self.calls.lock().push(call);
    }
}

impl WindowLog {
    pub fn calls(&self) -> Vec<WindowCall> {
        self.calls.lock().clone()
    }

    pub fn count(&self, pred: impl Fn(&WindowCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|c| pred(*c)).count()
    }

    pub fn frames(&self) -> usize {
        self.count(|c| *c == WindowCall::RenderFrame)
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

impl WindowBackend for RecordingWindow {
    fn set_title(&mut self, title: &str) {
        self.record(WindowCall::SetTitle(title.to_string()));
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.record(WindowCall::SetSize(width, height));
    }

    fn set_window_mode(&mut self, mode: WindowMode) {
        self.record(WindowCall::SetWindowMode(mode));
    }

    fn render_frame(&mut self) -> ShellResult<()> {
        self.record(WindowCall::RenderFrame);
        if self.fail_frames {
            return Err(ShellError::Render {
                message: "recording window set to fail".to_string(),
            });
        }
        Ok(())
    }

    fn destroy(&mut self) {
        self.record(WindowCall::Destroy);
    }
}
