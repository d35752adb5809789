use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crossbeam_channel::{Receiver, Sender};
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use walkdir::WalkDir;

use crate::error::{watch_error, ShellResult};

/// Type of file change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Touched,
    Removed,
}

/// File change event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn touched(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: ChangeKind::Touched,
        }
    }

    pub fn removed(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: ChangeKind::Removed,
        }
    }
}

/// A watched directory tree that reports file changes.
///
/// Implementations deliver events for the same file in the order the
/// filesystem reported them. `next_events` never blocks.
pub trait ChangeSource: Send {
    /// Begin observing `root`
    fn open(&mut self, root: &Path) -> ShellResult<()>;

    /// Files under `root` that exist right now and pass the filter
    fn enumerate_existing(&self, root: &Path) -> Vec<PathBuf>;

    /// Everything that arrived since the last call
    fn next_events(&mut self) -> Vec<ChangeEvent>;

    /// Extend the watch set with a single file
    fn watch_file(&mut self, path: &Path) -> ShellResult<()>;

    /// Release the OS watch. Returns true only on the call that released it.
    fn close(&mut self) -> bool;

    fn is_open(&self) -> bool;
}

/// File filter for specific extensions
#[derive(Debug, Clone)]
pub struct FileFilter {
    extensions: Vec<String>,
}

impl FileFilter {
    /// Create new filter with extensions
    pub fn new<S: AsRef<str>>(extensions: &[S]) -> Self {
        Self {
            extensions: extensions
                .iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    /// Check if file passes filter
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}

/// Walk `root` once and collect the matching regular files, sorted by path.
///
/// A missing or unreadable root yields nothing.
pub fn scan_existing(root: &Path, filter: &FileFilter) -> Vec<PathBuf> {
    if !root.is_dir() {
        log::warn!("[watcher] Config root {} is not a directory", root.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("[watcher] Skipping unreadable entry under {}: {}", root.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && filter.matches(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Map one notify event onto our change events
fn convert_event(event: Event, filter: &FileFilter) -> Vec<ChangeEvent> {
    let kind = match event.kind {
        EventKind::Create(_) => ChangeKind::Touched,
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => ChangeKind::Removed,
        EventKind::Modify(_) => ChangeKind::Touched,
        EventKind::Remove(_) => ChangeKind::Removed,
        _ => return Vec::new(),
    };

    // A rename reported with both sides carries [from, to]
    if let EventKind::Modify(ModifyKind::Name(RenameMode::Both)) = event.kind {
        let mut paths = event.paths.into_iter();
        let from = paths.next();
        let to = paths.next();
        return from
            .map(ChangeEvent::removed)
            .into_iter()
            .chain(to.map(ChangeEvent::touched))
            .filter(|e| filter.matches(&e.path))
            .collect();
    }

    event
        .paths
        .into_iter()
        .filter(|path| filter.matches(path))
        .map(|path| ChangeEvent { path, kind })
        .collect()
}

/// Change source backed by the platform file watcher.
///
/// The notify callback thread is the only writer into the channel; the
/// owner drains it with `next_events`.
pub struct NotifyChangeSource {
    filter: FileFilter,

    /// Notify watcher instance, `None` until opened and after close
    watcher: Option<RecommendedWatcher>,

    tx: Sender<ChangeEvent>,
    rx: Receiver<ChangeEvent>,

    root: Option<PathBuf>,

    /// Individually watched files
    watched_files: HashSet<PathBuf>,
}

impl NotifyChangeSource {
    pub fn new(filter: FileFilter) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            filter,
            watcher: None,
            tx,
            rx,
            root: None,
            watched_files: HashSet::new(),
        }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn watched_files(&self) -> impl Iterator<Item = &Path> {
        self.watched_files.iter().map(PathBuf::as_path)
    }

    /// Whether `path` is already covered by the recursive root watch
    fn covered_by_root(&self, path: &Path) -> bool {
        match &self.root {
            Some(root) => path.starts_with(root),
            None => false,
        }
    }
}

impl ChangeSource for NotifyChangeSource {
    fn open(&mut self, root: &Path) -> ShellResult<()> {
        if self.watcher.is_some() {
            self.close();
        }

        let tx = self.tx.clone();
        let filter = self.filter.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                for change in convert_event(event, &filter) {
                    // The receiver only goes away together with the watcher
                    let _ = tx.send(change);
                }
            }
            Err(e) => log::warn!("[watcher] Watch error: {}", e),
        })
        .map_err(|e| watch_error(root, e))?;

        watcher
            .watch(root, RecursiveMode::Recursive)
            .map_err(|e| watch_error(root, e))?;

        log::info!("[watcher] Watching {}", root.display());
        self.watcher = Some(watcher);
        self.root = Some(root.to_path_buf());
        Ok(())
    }

    fn enumerate_existing(&self, root: &Path) -> Vec<PathBuf> {
        scan_existing(root, &self.filter)
    }

    fn next_events(&mut self) -> Vec<ChangeEvent> {
        self.rx.try_iter().collect()
    }

    fn watch_file(&mut self, path: &Path) -> ShellResult<()> {
        if self.watched_files.contains(path) {
            return Ok(());
        }
        let covered = self.covered_by_root(path);
        let watcher = self
            .watcher
            .as_mut()
            .ok_or_else(|| watch_error(path, "change source is not open"))?;

        // Files inside the root are already reported by the recursive watch
        if !covered {
            watcher
                .watch(path, RecursiveMode::NonRecursive)
                .map_err(|e| watch_error(path, e))?;
            log::debug!("[watcher] Watching file {}", path.display());
        }
        self.watched_files.insert(path.to_path_buf());
        Ok(())
    }

    fn close(&mut self) -> bool {
        match self.watcher.take() {
            Some(watcher) => {
                drop(watcher);
                self.watched_files.clear();
                if let Some(root) = self.root.take() {
                    log::info!("[watcher] Stopped watching {}", root.display());
                }
                true
            }
            None => false,
        }
    }

    fn is_open(&self) -> bool {
        self.watcher.is_some()
    }
}

impl Drop for NotifyChangeSource {
    fn drop(&mut self) {
        self.close();
    }
}
