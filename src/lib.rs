pub mod app;
pub mod config;
pub mod error;
pub mod hot_reload;
pub mod window;

use std::path::PathBuf;

pub use app::run_app;
pub use config::{ConfigFragment, LiveConfig, WindowMode};
pub use error::{ShellError, ShellResult};
pub use hot_reload::{ChangeEvent, ChangeKind, ChangeSource, ControllerState, ReloadController};
pub use window::{WindowBackend, WindowSync};

/// Environment variable overriding the watched config directory
pub const CONFIG_DIR_ENV: &str = "EARTH_SHELL_CONFIG_DIR";

/// Main shell configuration
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Directory watched for manifest and settings files
    pub config_root: PathBuf,

    /// File extensions treated as configuration
    pub extensions: Vec<String>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            config_root: PathBuf::from("config"),
            extensions: vec!["yml".to_string(), "yaml".to_string()],
        }
    }
}

impl ShellConfig {
    /// Defaults, with the root taken from `EARTH_SHELL_CONFIG_DIR` when set
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var_os(CONFIG_DIR_ENV).map(PathBuf::from))
    }

    fn from_env_value(root: Option<PathBuf>) -> Self {
        let mut config = Self::default();
        if let Some(root) = root.filter(|r| !r.as_os_str().is_empty()) {
            config.config_root = root;
        }
        config
    }
}
