//! In-memory change source
//!
//! Stands in for the platform watcher wherever the filesystem should not be
//! involved. Events are injected through a [`ManualChangeHandle`], which can be
//! cloned and sent to other threads.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;

use super::watcher::{ChangeEvent, ChangeSource};
use crate::error::{watch_error, ShellResult};

#[derive(Default)]
struct Shared {
    watched: Vec<PathBuf>,
    closes: usize,
}

/// Scripted change source
pub struct ManualChangeSource {
    existing: Vec<PathBuf>,
    fail_open: bool,
    open: bool,
    watched_set: HashSet<PathBuf>,
    rx: Receiver<ChangeEvent>,
    shared: Arc<Mutex<Shared>>,
}

/// Injects events into, and inspects, a [`ManualChangeSource`]
#[derive(Clone)]
pub struct ManualChangeHandle {
    tx: Sender<ChangeEvent>,
    shared: Arc<Mutex<Shared>>,
}

impl ManualChangeSource {
    pub fn new() -> (Self, ManualChangeHandle) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let shared = Arc::new(Mutex::new(Shared::default()));
        let handle = ManualChangeHandle {
            tx,
            shared: shared.clone(),
        };
        (
            Self {
                existing: Vec::new(),
                fail_open: false,
                open: false,
                watched_set: HashSet::new(),
                rx,
                shared,
            },
            handle,
        )
    }

    /// Paths reported by `enumerate_existing`
    pub fn with_existing(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.existing = paths.into_iter().collect();
        self
    }

    /// Make `open` fail the way an exhausted watch limit would
    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }
}

impl ManualChangeHandle {
    pub fn push(&self, event: ChangeEvent) {
        let _ = self.tx.send(event);
    }

    /// Every path passed to `watch_file`, in call order, duplicates removed
    pub fn watched(&self) -> Vec<PathBuf> {
        self.shared.lock().watched.clone()
    }

    /// How many times `close` actually released the source
    pub fn close_count(&self) -> usize {
        self.shared.lock().closes
    }
}

impl ChangeSource for ManualChangeSource {
    fn open(&mut self, root: &Path) -> ShellResult<()> {
        if self.fail_open {
            return Err(watch_error(root, "watch limit reached"));
        }
        self.open = true;
        Ok(())
    }

    fn enumerate_existing(&self, _root: &Path) -> Vec<PathBuf> {
        self.existing.clone()
    }

    fn next_events(&mut self) -> Vec<ChangeEvent> {
        if !self.open {
            return Vec::new();
        }
        self.rx.try_iter().collect()
    }

    fn watch_file(&mut self, path: &Path) -> ShellResult<()> {
        if !self.open {
            return Err(watch_error(path, "change source is not open"));
        }
        if self.watched_set.insert(path.to_path_buf()) {
            self.shared.lock().watched.push(path.to_path_buf());
        }
        Ok(())
    }

    fn close(&mut self) -> bool {
        if !self.open {
            return false;
        }
        self.open = false;
        self.shared.lock().closes += 1;
        true
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_flow_only_while_open() {
        let (mut source, handle) = ManualChangeSource::new();
        handle.push(ChangeEvent::touched("a.yml"));
        assert!(source.next_events().is_empty());

        source.open(Path::new("config")).unwrap();
        assert_eq!(source.next_events(), vec![ChangeEvent::touched("a.yml")]);
        assert!(source.next_events().is_empty());
    }

    #[test]
    fn test_clone_of_handle_feeds_the_same_source() {
        let (mut source, handle) = ManualChangeSource::new();
        source.open(Path::new("config")).unwrap();

        let remote = handle.clone();
        std::thread::spawn(move || remote.push(ChangeEvent::touched("b.yml")))
            .join()
            .unwrap();
        drop(handle);

        assert_eq!(source.next_events(), vec![ChangeEvent::touched("b.yml")]);
    }

    #[test]
    fn test_failing_open_and_close_counting() {
        let (mut source, handle) = ManualChangeSource::new();
        let mut broken = ManualChangeSource::new().0.failing_open();
        assert!(broken.open(Path::new("config")).is_err());

        source.open(Path::new("config")).unwrap();
        source.watch_file(Path::new("a.yml")).unwrap();
        source.watch_file(Path::new("a.yml")).unwrap();
        assert_eq!(handle.watched(), vec![PathBuf::from("a.yml")]);

        assert!(source.close());
        assert!(!source.close());
        assert_eq!(handle.close_count(), 1);
    }
}
