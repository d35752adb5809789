use super::live::WindowMode;

/// Configuration carried by one parsed file.
///
/// `None` means the file did not specify the field. A fragment is created per
/// parse, handed to the merge engine, then dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFragment {
    pub display_name: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub window_mode: Option<WindowMode>,
}

impl ConfigFragment {
    /// True when no field is specified
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.width.is_none()
            && self.height.is_none()
            && self.window_mode.is_none()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_window_mode(mut self, mode: WindowMode) -> Self {
        self.window_mode = Some(mode);
        self
    }
}
