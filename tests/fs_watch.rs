//! Live reload through the platform file watcher

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use earth_shell::hot_reload::{ChangeSource, FileFilter, NotifyChangeSource, ReloadController};
use earth_shell::{ChangeKind, ShellConfig};
use tempfile::TempDir;

const DEADLINE: Duration = Duration::from_secs(5);

/// Tick until `done` holds or the deadline passes
fn tick_until(controller: &mut ReloadController, done: impl Fn(&ReloadController) -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < DEADLINE {
        controller.tick();
        if done(controller) {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    false
}

fn config_for(root: &Path) -> ShellConfig {
    ShellConfig {
        config_root: root.to_path_buf(),
        ..ShellConfig::default()
    }
}

#[test]
fn test_edit_is_picked_up_without_restart() {
    let dir = TempDir::new().expect("Failed to create temp config directory");
    let file = dir.path().join("game.yml");
    fs::write(&file, "name: Before\n").unwrap();

    let mut controller = ReloadController::with_config(config_for(dir.path()));
    assert!(controller.reload_enabled());
    controller.tick();
    assert_eq!(controller.live().display_name, "Before");

    fs::write(&file, "name: After\nwidth: 1100\n").unwrap();
    assert!(
        tick_until(&mut controller, |c| c.live().display_name == "After"),
        "edit was not observed within {:?}",
        DEADLINE
    );
    assert_eq!(controller.live().width, 1100);
}

#[test]
fn test_new_file_is_picked_up() {
    let dir = TempDir::new().unwrap();
    let mut controller = ReloadController::with_config(config_for(dir.path()));
    controller.tick();

    fs::write(dir.path().join("settings.yaml"), "height: 900\n").unwrap();
    assert!(tick_until(&mut controller, |c| c.live().height == 900));
}

#[test]
fn test_notify_source_reports_touch_and_removal() {
    let dir = TempDir::new().unwrap();
    let mut source = NotifyChangeSource::new(FileFilter::new(&["yml"]));
    source.open(dir.path()).expect("Failed to watch temp directory");

    let file = dir.path().join("game.yml");
    fs::write(&file, "name: x\n").unwrap();
    fs::write(dir.path().join("ignored.txt"), "x").unwrap();

    let mut seen = Vec::new();
    let start = Instant::now();
    while start.elapsed() < DEADLINE && !seen.iter().any(|e: &earth_shell::ChangeEvent| e.kind == ChangeKind::Touched) {
        seen.extend(source.next_events());
        std::thread::sleep(Duration::from_millis(20));
    }
    assert!(seen.iter().all(|e| e.path.extension().and_then(|x| x.to_str()) == Some("yml")));
    assert!(seen.iter().any(|e| e.kind == ChangeKind::Touched));

    fs::remove_file(&file).unwrap();
    let start = Instant::now();
    let mut removed = false;
    while start.elapsed() < DEADLINE && !removed {
        removed = source.next_events().iter().any(|e| e.kind == ChangeKind::Removed);
        std::thread::sleep(Duration::from_millis(20));
    }
    assert!(removed, "removal was not reported within {:?}", DEADLINE);

    assert!(source.close());
}

#[test]
fn test_file_outside_root_gets_its_own_watch() {
    let root = TempDir::new().unwrap();
    let elsewhere = TempDir::new().unwrap();
    let outside = elsewhere.path().join("extra.yml");
    fs::write(&outside, "name: Outside\n").unwrap();

    let mut source = NotifyChangeSource::new(FileFilter::new(&["yml"]));
    source.open(root.path()).expect("Failed to watch temp directory");
    source.watch_file(&outside).expect("Failed to watch file outside the root");
    assert!(source.watched_files().any(|p| p == outside.as_path()));

    fs::write(&outside, "name: Edited\n").unwrap();
    let start = Instant::now();
    let mut touched = false;
    while start.elapsed() < DEADLINE && !touched {
        touched = source
            .next_events()
            .iter()
            .any(|e| e.kind == ChangeKind::Touched && e.path == outside);
        std::thread::sleep(Duration::from_millis(20));
    }
    assert!(touched, "edit outside the root was not reported within {:?}", DEADLINE);

    assert!(source.close());
}
