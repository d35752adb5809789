//! Shell error handling
//!
//! Every failure the shell can hit is one of these variants. Only window
//! creation is fatal to a run; everything else is contained by the reload
//! controller, logged, and skipped.

use std::path::{Path, PathBuf};

/// Result alias used across the shell
pub type ShellResult<T> = Result<T, ShellError>;

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Failed to watch {}: {message}", .path.display())]
    WatchSetup { path: PathBuf, message: String },

    #[error("Window creation failed: {message}")]
    WindowCreation { message: String },

    #[error("Render failed: {message}")]
    Render { message: String },
}

impl ShellError {
    /// Whether this error should end the run
    pub fn is_fatal(&self) -> bool {
        matches!(self, ShellError::WindowCreation { .. })
    }

    /// Attach a path to a parse error produced without one
    pub fn with_path(self, new_path: &Path) -> Self {
        match self {
            ShellError::Parse { message, .. } => ShellError::Parse {
                path: new_path.to_path_buf(),
                message,
            },
            other => other,
        }
    }
}

/// Create an I/O error for a path
pub fn io_error(path: &Path, source: std::io::Error) -> ShellError {
    ShellError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Create a watch setup error for a path
pub fn watch_error(path: &Path, error: impl std::fmt::Display) -> ShellError {
    ShellError::WatchSetup {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}

/// Create a window creation error
pub fn window_error(error: impl std::fmt::Display) -> ShellError {
    ShellError::WindowCreation {
        message: error.to_string(),
    }
}
