//! Organizing a directory: scan its files, classify them by extension,
//! move them into category folders, and journal what happened.

mod category;
mod executor;
mod scanner;

pub use category::{
    all_category_names, category_for_path, category_for_suffix, dotted_suffix, CATEGORY_TABLE,
    FALLBACK_CATEGORY,
};
pub use executor::{
    execute_moves, plan_moves, ConflictPolicy, MoveEvent, OrganizeReport, PlannedMove,
};
pub(crate) use executor::move_file;
pub use scanner::{scan_directory, FileEntry};

use std::path::Path;

use crate::error::{AppError, Result};
use crate::history::{HistoryStore, OrganizeSession};

/// Knobs for one organize run.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrganizeOptions {
    /// Report the plan without moving anything.
    pub dry_run: bool,
    pub on_conflict: ConflictPolicy,
}

/// Organize every file sitting directly in `target`.
///
/// The scan snapshot is taken up front, files move in name order, and the
/// run stops at the first failure with earlier moves left in place. Applied
/// operations are journaled through `store` so the run can be undone, even
/// when it aborted partway.
pub fn organize(
    target: &Path,
    options: &OrganizeOptions,
    store: Option<&HistoryStore>,
    observer: &mut dyn FnMut(&MoveEvent),
) -> Result<OrganizeReport> {
    let target = target
        .canonicalize()
        .map_err(|_| AppError::not_a_directory(target))?;
    let entries = scan_directory(&target)?;
    let plan = plan_moves(entries);
    tracing::info!(
        target = %target.display(),
        files = plan.len(),
        dry_run = options.dry_run,
        "organizing"
    );

    let report = execute_moves(&target, &plan, options, observer);
    record(&target, options, store, &report);
    Ok(report)
}

/// Organize one file that appeared under `target`. Watch mode feeds single
/// arrivals through here. A path that is not a plain file is left alone,
/// the same way a scan skips it.
pub fn organize_file(
    target: &Path,
    file: &Path,
    options: &OrganizeOptions,
    store: Option<&HistoryStore>,
    observer: &mut dyn FnMut(&MoveEvent),
) -> Result<OrganizeReport> {
    let target = target
        .canonicalize()
        .map_err(|_| AppError::not_a_directory(target))?;
    if !target.is_dir() {
        return Err(AppError::not_a_directory(&target));
    }
    let file = file
        .canonicalize()
        .map_err(|_| AppError::FileNotFound {
            path: file.display().to_string(),
        })?;
    if !file.is_file() {
        tracing::debug!(file = %file.display(), "not a plain file, leaving it in place");
        return Ok(OrganizeReport::default());
    }

    let plan = plan_moves(vec![FileEntry::from_path(file)]);
    let report = execute_moves(&target, &plan, options, observer);
    record(&target, options, store, &report);
    Ok(report)
}

fn record(
    target: &Path,
    options: &OrganizeOptions,
    store: Option<&HistoryStore>,
    report: &OrganizeReport,
) {
    let Some(store) = store else { return };
    if options.dry_run || report.operations.is_empty() {
        return;
    }
    let session = OrganizeSession::new(
        target.display().to_string(),
        report.moved,
        report.operations.clone(),
    );
    if let Err(e) = store.record_session(target, session) {
        tracing::warn!("could not record history: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str, contents: &[u8]) {
        let mut file = File::create(dir.join(name)).unwrap();
        file.write_all(contents).unwrap();
    }

    #[test]
    fn organize_sorts_a_mixed_directory() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "photo.jpg", b"i");
        touch(tmp.path(), "song.mp3", b"a");
        touch(tmp.path(), "video.mp4", b"v");
        touch(tmp.path(), "archive.zip", b"z");
        touch(tmp.path(), "notes.txt", b"t");
        touch(tmp.path(), "mystery.dat", b"?");
        fs::create_dir(tmp.path().join("existing_dir")).unwrap();

        let report = organize(
            tmp.path(),
            &OrganizeOptions::default(),
            None,
            &mut |_| {},
        )
        .unwrap();

        assert!(report.success());
        assert_eq!(report.moved, 6);
        assert!(tmp.path().join("Images/photo.jpg").is_file());
        assert!(tmp.path().join("Audio/song.mp3").is_file());
        assert!(tmp.path().join("Video/video.mp4").is_file());
        assert!(tmp.path().join("Archives/archive.zip").is_file());
        assert!(tmp.path().join("Documents/notes.txt").is_file());
        assert!(tmp.path().join("Others/mystery.dat").is_file());
        // Untouched: the pre-existing directory.
        assert!(tmp.path().join("existing_dir").is_dir());
    }

    #[test]
    fn mixed_case_extensions_share_a_category_folder() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.jpg", b"1");
        touch(tmp.path(), "b.JPG", b"2");
        touch(tmp.path(), "c.xyz", b"3");
        fs::create_dir(tmp.path().join("sub")).unwrap();
        touch(&tmp.path().join("sub"), "inner.jpg", b"4");

        let report =
            organize(tmp.path(), &OrganizeOptions::default(), None, &mut |_| {}).unwrap();

        assert!(report.success());
        // Both jpgs in Images, name case preserved.
        assert!(tmp.path().join("Images/a.jpg").is_file());
        assert!(tmp.path().join("Images/b.JPG").is_file());
        assert!(tmp.path().join("Others/c.xyz").is_file());
        // The subfolder and its contents are untouched.
        assert!(tmp.path().join("sub/inner.jpg").is_file());
    }

    #[test]
    fn organize_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "photo.jpg", b"i");

        let first = organize(tmp.path(), &OrganizeOptions::default(), None, &mut |_| {}).unwrap();
        assert_eq!(first.moved, 1);

        // Second run sees only category folders, which are skipped.
        let second = organize(tmp.path(), &OrganizeOptions::default(), None, &mut |_| {}).unwrap();
        assert!(second.success());
        assert_eq!(second.moved, 0);
        assert!(tmp.path().join("Images/photo.jpg").is_file());
    }

    #[test]
    fn empty_directory_reports_nothing() {
        let tmp = TempDir::new().unwrap();
        let report =
            organize(tmp.path(), &OrganizeOptions::default(), None, &mut |_| {}).unwrap();
        assert!(report.success());
        assert_eq!(report.planned, 0);
        assert_eq!(report.moved, 0);
    }

    #[test]
    fn missing_target_fails_before_anything_moves() {
        let tmp = TempDir::new().unwrap();
        let err = organize(
            &tmp.path().join("nope"),
            &OrganizeOptions::default(),
            None,
            &mut |_| {},
        )
        .unwrap_err();
        assert!(matches!(err, AppError::NotADirectory { .. }));
    }

    #[test]
    fn sessions_are_journaled_for_undo() {
        let tmp = TempDir::new().unwrap();
        let folder = tmp.path().join("inbox");
        fs::create_dir(&folder).unwrap();
        touch(&folder, "photo.jpg", b"i");
        let store = crate::history::HistoryStore::with_dir(tmp.path().join("journals"), 10);

        organize(&folder, &OrganizeOptions::default(), Some(&store), &mut |_| {}).unwrap();

        let history = store.load(&folder).unwrap().unwrap();
        assert_eq!(history.sessions.len(), 1);
        assert_eq!(history.sessions[0].files_moved, 1);
        // Folder create plus one move.
        assert_eq!(history.sessions[0].operations.len(), 2);
    }

    #[test]
    fn dry_run_records_no_session() {
        let tmp = TempDir::new().unwrap();
        let folder = tmp.path().join("inbox");
        fs::create_dir(&folder).unwrap();
        touch(&folder, "photo.jpg", b"i");
        let store = crate::history::HistoryStore::with_dir(tmp.path().join("journals"), 10);

        let options = OrganizeOptions {
            dry_run: true,
            ..OrganizeOptions::default()
        };
        organize(&folder, &options, Some(&store), &mut |_| {}).unwrap();

        assert!(store.load(&folder).unwrap().is_none());
        assert!(folder.join("photo.jpg").is_file());
    }

    #[test]
    fn organize_file_routes_a_single_arrival() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "drop.pdf", b"doc");

        let report = organize_file(
            tmp.path(),
            &tmp.path().join("drop.pdf"),
            &OrganizeOptions::default(),
            None,
            &mut |_| {},
        )
        .unwrap();

        assert!(report.success());
        assert_eq!(report.moved, 1);
        assert!(tmp.path().join("Documents/drop.pdf").is_file());
    }

    #[test]
    fn organize_file_leaves_directories_alone() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("photos.jpg");
        fs::create_dir(&dir).unwrap();

        let report = organize_file(
            tmp.path(),
            &dir,
            &OrganizeOptions::default(),
            None,
            &mut |_| {},
        )
        .unwrap();

        assert!(report.success());
        assert_eq!(report.planned, 0);
        assert_eq!(report.moved, 0);
        assert!(dir.is_dir());
        assert!(!tmp.path().join("Images").exists());
    }
}
