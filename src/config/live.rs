/// Display name used until a manifest provides one
pub const UNNAMED_PLACEHOLDER: &str = "Unnamed";

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;

/// How the window occupies the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowMode {
    Windowed,
    Fullscreen,
    Unknown,
}

impl WindowMode {
    /// Resolve a document token. Anything unrecognised is `Unknown`.
    pub fn from_token(token: &str) -> Self {
        let token = token.trim();
        if token.eq_ignore_ascii_case("windowed") {
            WindowMode::Windowed
        } else if token.eq_ignore_ascii_case("fullscreen") {
            WindowMode::Fullscreen
        } else {
            WindowMode::Unknown
        }
    }

    pub fn is_known(self) -> bool {
        self != WindowMode::Unknown
    }
}

/// The configuration currently applied to the window.
///
/// Always fully populated: fields start at the defaults and are only ever
/// replaced by the merge engine, never cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveConfig {
    pub display_name: String,
    pub width: u32,
    pub height: u32,
    pub window_mode: WindowMode,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            display_name: UNNAMED_PLACEHOLDER.to_string(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            window_mode: WindowMode::Windowed,
        }
    }
}

impl LiveConfig {
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
