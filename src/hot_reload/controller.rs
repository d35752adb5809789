use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::queue::EventQueue;
use super::watcher::{ChangeEvent, ChangeKind, ChangeSource, FileFilter, NotifyChangeSource};
use crate::config::{merge_fragment, parse_document, LiveConfig};
use crate::error::{io_error, ShellResult};
use crate::window::{WindowBackend, WindowSync};
use crate::ShellConfig;

/// Lifecycle of a reload controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Uninitialized,
    Watching,
    Running,
    Finished,
}

/// Cloneable cancellation flag observed at the start of every tick
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    cancelled: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Counters for what the pipeline has done so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReloadStats {
    pub frames: u64,
    pub applied: u64,
    pub parse_failures: u64,
    pub io_failures: u64,
    pub removals_ignored: u64,
}

/// Owns the live configuration and drives watch, parse, merge and apply once
/// per frame.
pub struct ReloadController {
    config: ShellConfig,
    live: LiveConfig,
    state: ControllerState,
    source: Box<dyn ChangeSource>,
    reload_enabled: bool,
    queue: EventQueue,
    window: Option<WindowSync>,
    shutdown: ShutdownSignal,
    stats: ReloadStats,
}

impl ReloadController {
    /// Controller with the default config root, watched by the platform watcher
    pub fn new() -> Self {
        Self::with_config(ShellConfig::default())
    }

    pub fn with_config(config: ShellConfig) -> Self {
        let source = NotifyChangeSource::new(FileFilter::new(&config.extensions));
        Self::with_source(config, Box::new(source))
    }

    /// Controller over any change source.
    ///
    /// Opens the root and queues every file already present so the first tick
    /// loads them exactly as if they had just been edited. A root that cannot
    /// be watched only disables live reload.
    pub fn with_source(config: ShellConfig, source: Box<dyn ChangeSource>) -> Self {
        let mut controller = Self {
            config,
            live: LiveConfig::default(),
            state: ControllerState::Uninitialized,
            source,
            reload_enabled: false,
            queue: EventQueue::new(),
            window: None,
            shutdown: ShutdownSignal::new(),
            stats: ReloadStats::default(),
        };
        controller.start_watching();
        controller
    }

    fn start_watching(&mut self) {
        let root = self.config.config_root.clone();

        match self.source.open(&root) {
            Ok(()) => self.reload_enabled = true,
            Err(e) => {
                log::error!("[reload] Live reload disabled: {}", e);
                self.reload_enabled = false;
            }
        }

        let existing = self.source.enumerate_existing(&root);
        log::info!(
            "[reload] Found {} config file(s) under {}",
            existing.len(),
            root.display()
        );
        for path in existing {
            self.extend_watch(&path);
            self.queue.push(ChangeEvent::touched(path));
        }

        self.state = ControllerState::Watching;
    }

    /// Run one loop iteration and return the state afterwards.
    ///
    /// In order: pull new change events, then drain them, merging each file and
    /// pushing the result to the window as it lands, then render one frame.
    pub fn tick(&mut self) -> ControllerState {
        if self.state == ControllerState::Finished {
            return self.state;
        }
        if self.shutdown.is_cancelled() {
            self.finish();
            return self.state;
        }
        if self.state == ControllerState::Watching {
            log::debug!("[reload] Entering update loop");
            self.state = ControllerState::Running;
        }

        if self.reload_enabled {
            self.queue.forward_from(&mut *self.source);
        }
        self.drain_pending();

        if let Some(window) = self.window.as_mut() {
            window.apply(&self.live);
            window.render();
        }
        self.stats.frames += 1;

        self.state
    }

    /// Apply every queued event. Returns how many events were drained.
    pub fn drain_pending(&mut self) -> usize {
        let mut events = Vec::new();
        let drained = self.queue.drain_all(|event| events.push(event));
        for event in events {
            self.process_event(event);
        }
        drained
    }

    fn process_event(&mut self, event: ChangeEvent) {
        match event.kind {
            ChangeKind::Touched => {
                if let Err(e) = self.process_path(&event.path) {
                    log::warn!("[reload] Keeping current configuration: {}", e);
                }
            }
            ChangeKind::Removed => {
                log::info!(
                    "[reload] {} removed, its last values stay live",
                    event.path.display()
                );
                self.stats.removals_ignored += 1;
            }
        }
    }

    /// Read, parse and merge one file into the live configuration
    pub fn process_path(&mut self, path: &Path) -> ShellResult<()> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.stats.io_failures += 1;
                return Err(io_error(path, e));
            }
        };

        let fragment = match parse_document(&bytes) {
            Ok(fragment) => fragment,
            Err(e) => {
                self.stats.parse_failures += 1;
                return Err(e.with_path(path));
            }
        };

        let report = merge_fragment(&mut self.live, &fragment);
        self.stats.applied += 1;
        if let Some(window) = self.window.as_mut() {
            window.apply(&self.live);
        }
        if report.any() {
            log::info!("[reload] Applied {}: {:?}", path.display(), self.live);
        } else {
            log::debug!("[reload] {} changed nothing", path.display());
        }

        self.extend_watch(path);
        Ok(())
    }

    fn extend_watch(&mut self, path: &Path) {
        if !self.reload_enabled {
            return;
        }
        if let Err(e) = self.source.watch_file(path) {
            log::warn!("[reload] {}", e);
        }
    }

    /// Take ownership of the window. A previously attached window is destroyed.
    pub fn attach_window(&mut self, backend: Box<dyn WindowBackend>) {
        if self.state == ControllerState::Finished {
            log::warn!("[reload] Ignoring window attached after shutdown");
            let mut late = WindowSync::new(backend);
            late.destroy();
            return;
        }
        if let Some(mut previous) = self.window.replace(WindowSync::new(backend)) {
            previous.destroy();
        }
    }

    /// Stop immediately, as if the shutdown signal had fired
    pub fn shutdown(&mut self) {
        self.shutdown.cancel();
        self.finish();
    }

    fn finish(&mut self) {
        if self.state == ControllerState::Finished {
            return;
        }
        if self.source.close() {
            log::info!("[reload] Change source closed");
        }
        if let Some(window) = self.window.as_mut() {
            window.destroy();
        }
        self.state = ControllerState::Finished;
        log::info!("[reload] Finished after {} frame(s): {:?}", self.stats.frames, self.stats);
    }

    pub fn live(&self) -> &LiveConfig {
        &self.live
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn stats(&self) -> ReloadStats {
        self.stats
    }

    pub fn reload_enabled(&self) -> bool {
        self.reload_enabled
    }

    pub fn root(&self) -> &Path {
        &self.config.config_root
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Queue a synthetic change, as the watcher would
    pub fn enqueue(&self, path: impl Into<PathBuf>) {
        self.queue.push(ChangeEvent::touched(path));
    }
}

impl Default for ReloadController {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ReloadController {
    fn drop(&mut self) {
        self.finish();
    }
}
