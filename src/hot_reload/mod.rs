/// Hot-Reload System
///
/// Keeps the window's configuration in step with the files on disk without
/// restarting. A platform watcher feeds change events into a queue; once per
/// frame the reload controller drains it, parses each touched file and merges
/// the result into the live configuration.
///
/// Key features:
/// - Initial scan queued as synthetic edits, so startup and live edits share one path
/// - Non-blocking drain on the update loop
/// - Bad or partial files never regress the live configuration

pub mod controller;
pub mod manual;
pub mod queue;
pub mod watcher;

pub use controller::{ControllerState, ReloadController, ReloadStats, ShutdownSignal};
pub use manual::{ManualChangeHandle, ManualChangeSource};
pub use queue::{EventQueue, QueueIntake};
pub use watcher::{scan_existing, ChangeEvent, ChangeKind, ChangeSource, FileFilter, NotifyChangeSource};
