/// Window Collaborator
///
/// The narrow surface the reload controller drives: title, size, mode, one
/// frame per loop iteration, and a single teardown. The production backend is
/// a winit window presenting through wgpu; `RecordingWindow` stands in for it
/// wherever no display is available.

pub mod recording;
pub mod winit_backend;

pub use recording::{RecordingWindow, WindowCall, WindowLog};
pub use winit_backend::WinitWindow;

use crate::config::{LiveConfig, WindowMode};
use crate::error::ShellResult;

/// Capabilities the shell needs from a native window
pub trait WindowBackend {
    fn set_title(&mut self, title: &str);
    fn set_size(&mut self, width: u32, height: u32);
    fn set_window_mode(&mut self, mode: WindowMode);
    fn render_frame(&mut self) -> ShellResult<()>;
    fn destroy(&mut self);
}

/// An attached window plus the last values sent to it.
///
/// Native calls are only made when a value differs from what was sent
/// before, and `destroy` reaches the backend at most once.
pub struct WindowSync {
    backend: Box<dyn WindowBackend>,
    last_title: Option<String>,
    last_size: Option<(u32, u32)>,
    last_mode: Option<WindowMode>,
    destroyed: bool,
}

impl WindowSync {
    pub fn new(backend: Box<dyn WindowBackend>) -> Self {
        Self {
            backend,
            last_title: None,
            last_size: None,
            last_mode: None,
            destroyed: false,
        }
    }

    /// Push title, size and mode if any of them changed
    pub fn apply(&mut self, live: &LiveConfig) {
        if self.destroyed {
            return;
        }

        if self.last_title.as_deref() != Some(live.display_name.as_str()) {
            log::debug!("[window] Title -> {}", live.display_name);
            self.backend.set_title(&live.display_name);
            self.last_title = Some(live.display_name.clone());
        }

        let size = live.size();
        if self.last_size != Some(size) {
            log::debug!("[window] Size -> {}x{}", size.0, size.1);
            self.backend.set_size(size.0, size.1);
            self.last_size = Some(size);
        }

        if live.window_mode.is_known() && self.last_mode != Some(live.window_mode) {
            log::debug!("[window] Mode -> {:?}", live.window_mode);
            self.backend.set_window_mode(live.window_mode);
            self.last_mode = Some(live.window_mode);
        }
    }

    /// Draw one frame. Errors are logged and the loop carries on.
    pub fn render(&mut self) {
        if self.destroyed {
            return;
        }
        if let Err(e) = self.backend.render_frame() {
            log::warn!("[window] Frame failed: {}", e);
        }
    }

    /// Returns true only on the call that destroyed the window
    pub fn destroy(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        self.destroyed = true;
        self.backend.destroy();
        log::info!("[window] Destroyed");
        true
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_only_sends_changes() {
        let (window, log) = RecordingWindow::new();
        let mut sync = WindowSync::new(Box::new(window));
        let mut live = LiveConfig::default();

        sync.apply(&live);
        sync.apply(&live);
        assert_eq!(
            log.calls(),
            vec![
                WindowCall::SetTitle("Unnamed".into()),
                WindowCall::SetSize(800, 600),
                WindowCall::SetWindowMode(WindowMode::Windowed),
            ]
        );

        live.width = 1024;
        sync.apply(&live);
        assert_eq!(log.count(|c| matches!(c, WindowCall::SetSize(..))), 2);
        assert_eq!(log.count(|c| matches!(c, WindowCall::SetTitle(_))), 1);
    }

    #[test]
    fn test_destroy_happens_once_and_silences_the_window() {
        let (window, log) = RecordingWindow::new();
        let mut sync = WindowSync::new(Box::new(window));

        assert!(sync.destroy());
        assert!(!sync.destroy());
        sync.render();
        sync.apply(&LiveConfig::default());

        assert_eq!(log.calls(), vec![WindowCall::Destroy]);
        assert!(sync.is_destroyed());
    }

    #[test]
    fn test_render_errors_do_not_propagate() {
        let (window, log) = RecordingWindow::new();
        let mut sync = WindowSync::new(Box::new(window.failing_frames()));
        sync.render();
        sync.render();
        assert_eq!(log.frames(), 2);
    }
}
