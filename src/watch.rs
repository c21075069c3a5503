//! Watch mode: keep a directory organized as new files arrive.
//!
//! Events are debounced so files are only touched once they settle.
//! Per-arrival failures are logged and the loop keeps running; only
//! watcher setup errors end the watch.

use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

use notify::event::ModifyKind;
use notify::{EventKind, RecursiveMode};
use notify_debouncer_full::{new_debouncer, DebounceEventResult};

use crate::config::DEFAULT_WATCH_DEBOUNCE;
use crate::error::{AppError, Result};
use crate::history::HistoryStore;
use crate::organize::{organize_file, ConflictPolicy, MoveEvent, OrganizeOptions};

/// Name suffixes of in-progress downloads. These fire again when the
/// download finishes under its final name, so they are left alone.
const PARTIAL_SUFFIXES: &[&str] = &[".tmp", ".crdownload", ".part", ".download"];

#[derive(Debug, Clone, Copy)]
pub struct WatchOptions {
    pub on_conflict: ConflictPolicy,
    pub debounce: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            on_conflict: ConflictPolicy::default(),
            debounce: DEFAULT_WATCH_DEBOUNCE,
        }
    }
}

/// Organize `target` once, then block watching it and route each settled
/// arrival into its category folder. Runs until the process is interrupted.
pub fn watch_directory(
    target: &Path,
    options: &WatchOptions,
    store: Option<&HistoryStore>,
    observer: &mut dyn FnMut(&MoveEvent),
) -> Result<()> {
    let target = target
        .canonicalize()
        .map_err(|_| AppError::not_a_directory(target))?;
    if !target.is_dir() {
        return Err(AppError::not_a_directory(&target));
    }

    let organize_options = OrganizeOptions {
        dry_run: false,
        on_conflict: options.on_conflict,
    };

    // Initial pass so the watch starts from an organized state.
    let initial = crate::organize::organize(&target, &organize_options, store, observer)?;
    for error in &initial.errors {
        tracing::warn!("{error}");
    }

    let (tx, rx) = mpsc::channel();
    let mut debouncer = new_debouncer(options.debounce, None, move |result: DebounceEventResult| {
        let _ = tx.send(result);
    })?;
    debouncer.watch(&target, RecursiveMode::NonRecursive)?;
    tracing::info!(target = %target.display(), "watching for new files");

    for result in rx {
        let batch = match result {
            Ok(events) => events,
            Err(errors) => {
                for error in errors {
                    tracing::warn!("watch error: {error}");
                }
                continue;
            }
        };

        for event in batch {
            if !is_arrival(&event.kind) {
                continue;
            }
            for path in &event.paths {
                if !should_organize(path) {
                    continue;
                }
                match organize_file(&target, path, &organize_options, store, observer) {
                    Ok(report) if !report.success() => {
                        for error in &report.errors {
                            tracing::warn!("{error}");
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(file = %path.display(), "could not organize arrival: {e}");
                    }
                }
            }
        }
    }

    Ok(())
}

/// Creations, plus renames into the directory, which is how downloads and
/// drag-and-drop moves usually land.
fn is_arrival(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(ModifyKind::Name(_))
    )
}

/// Whether an event path is a settled, plain file worth organizing.
fn should_organize(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if name.starts_with('.') {
        return false;
    }
    let lower = name.to_lowercase();
    if PARTIAL_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
        return false;
    }

    match std::fs::symlink_metadata(path) {
        Ok(meta) => {
            if meta.file_type().is_symlink() || meta.is_dir() {
                return false;
            }
            // Zero bytes usually means a placeholder still being written.
            meta.len() > 0
        }
        // Vanished between the event and now.
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents).unwrap();
        path
    }

    #[test]
    fn settled_files_are_organizable() {
        let tmp = TempDir::new().unwrap();
        let path = touch(tmp.path(), "report.pdf", b"doc");
        assert!(should_organize(&path));
    }

    #[test]
    fn hidden_and_partial_files_are_skipped() {
        let tmp = TempDir::new().unwrap();
        assert!(!should_organize(&touch(tmp.path(), ".hidden.pdf", b"x")));
        assert!(!should_organize(&touch(tmp.path(), "video.mp4.part", b"x")));
        assert!(!should_organize(&touch(tmp.path(), "setup.TMP", b"x")));
        assert!(!should_organize(&touch(tmp.path(), "photo.crdownload", b"x")));
    }

    #[test]
    fn directories_and_empty_files_are_skipped() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("folder.jpg");
        fs::create_dir(&dir).unwrap();
        assert!(!should_organize(&dir));
        assert!(!should_organize(&touch(tmp.path(), "empty.txt", b"")));
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_skipped() {
        let tmp = TempDir::new().unwrap();
        let real = touch(tmp.path(), "real.txt", b"x");
        let link = tmp.path().join("link.txt");
        std::os::unix::fs::symlink(&real, &link).unwrap();
        assert!(!should_organize(&link));
    }

    #[test]
    fn vanished_paths_are_skipped() {
        let tmp = TempDir::new().unwrap();
        assert!(!should_organize(&tmp.path().join("never-existed.txt")));
    }

    #[test]
    fn arrival_kinds_cover_creates_and_renames() {
        use notify::event::{CreateKind, MetadataKind, RenameMode};
        assert!(is_arrival(&EventKind::Create(CreateKind::File)));
        assert!(is_arrival(&EventKind::Modify(ModifyKind::Name(
            RenameMode::To
        ))));
        assert!(!is_arrival(&EventKind::Modify(ModifyKind::Metadata(
            MetadataKind::Any
        ))));
        assert!(!is_arrival(&EventKind::Remove(
            notify::event::RemoveKind::File
        )));
    }
}
