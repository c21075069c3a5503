//! On-disk session journal, one file per organized folder.
//!
//! Journals live under the platform config directory (or wherever
//! `SORTBOX_HISTORY_DIR` points), named by a short hash of the folder's
//! canonical path. Writes go through a temp file plus rename and are
//! serialized by an exclusive lock, so concurrent runs cannot tear the
//! journal.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::config::Config;
use crate::error::{AppError, Result};

use super::checksum::hash_folder_path;
use super::entry::{FolderHistory, OrganizeSession, SessionSummary, HISTORY_SCHEMA_VERSION};

const APP_DIR: &str = "sortbox";
const HISTORY_SUBDIR: &str = "history";

pub struct HistoryStore {
    history_dir: PathBuf,
    max_sessions: usize,
}

impl HistoryStore {
    /// Store rooted at the configured location, or the platform config
    /// directory when none is set.
    pub fn new(config: &Config) -> Result<Self> {
        let history_dir = match &config.history_dir {
            Some(dir) => dir.clone(),
            None => dirs::config_dir()
                .ok_or_else(|| AppError::history("no config directory on this platform"))?
                .join(APP_DIR)
                .join(HISTORY_SUBDIR),
        };
        Ok(Self {
            history_dir,
            max_sessions: config.max_sessions,
        })
    }

    /// Store rooted at an explicit directory. Tests use this to stay inside
    /// a temp dir.
    pub fn with_dir(history_dir: impl Into<PathBuf>, max_sessions: usize) -> Self {
        Self {
            history_dir: history_dir.into(),
            max_sessions: max_sessions.max(1),
        }
    }

    /// Canonical string key for a folder. The folder must exist.
    pub fn folder_key(&self, folder: &Path) -> Result<String> {
        let canonical = folder
            .canonicalize()
            .map_err(|_| AppError::not_a_directory(folder))?;
        Ok(canonical.display().to_string())
    }

    /// Append a session to the folder's journal, creating it on first use.
    /// A corrupt journal is replaced rather than blocking new history.
    pub fn record_session(&self, folder: &Path, session: OrganizeSession) -> Result<()> {
        let key = self.folder_key(folder)?;
        let _lock = self.acquire_lock(&key)?;

        let mut history = match self.load_by_key(&key) {
            Ok(Some(history)) => history,
            Ok(None) => FolderHistory::new(&key),
            Err(e) => {
                tracing::warn!(folder = %key, "unreadable journal, starting fresh: {e}");
                FolderHistory::new(&key)
            }
        };
        history.add_session(session, self.max_sessions);
        self.atomic_write(&key, &history)
    }

    pub fn load(&self, folder: &Path) -> Result<Option<FolderHistory>> {
        let key = self.folder_key(folder)?;
        self.load_by_key(&key)
    }

    /// Persist a history updated in memory (undo flags sessions this way).
    pub fn save(&self, folder: &Path, history: &FolderHistory) -> Result<()> {
        let key = self.folder_key(folder)?;
        let _lock = self.acquire_lock(&key)?;
        self.atomic_write(&key, history)
    }

    pub fn summaries(&self, folder: &Path) -> Result<Vec<SessionSummary>> {
        Ok(self
            .load(folder)?
            .map(|history| history.summaries())
            .unwrap_or_default())
    }

    fn journal_path(&self, key: &str) -> PathBuf {
        self.history_dir
            .join(format!("{}.history.json", hash_folder_path(key)))
    }

    fn lock_path(&self, key: &str) -> PathBuf {
        self.history_dir
            .join(format!("{}.lock", hash_folder_path(key)))
    }

    /// Exclusive per-folder lock, released when the handle drops.
    fn acquire_lock(&self, key: &str) -> Result<File> {
        fs::create_dir_all(&self.history_dir)?;
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(self.lock_path(key))?;
        file.lock_exclusive()
            .map_err(|e| AppError::history(format!("could not lock journal: {e}")))?;
        Ok(file)
    }

    fn load_by_key(&self, key: &str) -> Result<Option<FolderHistory>> {
        let path = self.journal_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let file = File::open(&path)?;
        let history: FolderHistory = serde_json::from_reader(BufReader::new(file))?;
        if history.version != HISTORY_SCHEMA_VERSION {
            tracing::warn!(
                version = history.version,
                "unsupported journal schema, ignoring"
            );
            return Ok(None);
        }
        Ok(Some(history))
    }

    /// Write via temp file and rename so readers never see a torn journal.
    fn atomic_write(&self, key: &str, history: &FolderHistory) -> Result<()> {
        fs::create_dir_all(&self.history_dir)?;
        let final_path = self.journal_path(key);
        let tmp_path = final_path.with_extension("json.tmp");
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, history)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&tmp_path, &final_path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{OperationRecord, RecordedOperation};
    use tempfile::TempDir;

    fn store_in(tmp: &TempDir, max: usize) -> HistoryStore {
        HistoryStore::with_dir(tmp.path().join("journals"), max)
    }

    fn session_for(folder: &Path, files: usize) -> OrganizeSession {
        let operations = (1..=files as u32)
            .map(|seq| {
                RecordedOperation::new(
                    seq,
                    OperationRecord::Move {
                        source: folder.join(format!("f{seq}.txt")),
                        destination: folder.join(format!("Documents/f{seq}.txt")),
                    },
                    None,
                )
            })
            .collect();
        OrganizeSession::new(folder.display().to_string(), files, operations)
    }

    #[test]
    fn record_then_load_roundtrips() {
        let tmp = TempDir::new().unwrap();
        let folder = tmp.path().join("watched");
        fs::create_dir(&folder).unwrap();
        let store = store_in(&tmp, 10);

        store
            .record_session(&folder, session_for(&folder, 2))
            .unwrap();

        let history = store.load(&folder).unwrap().unwrap();
        assert_eq!(history.version, HISTORY_SCHEMA_VERSION);
        assert_eq!(history.sessions.len(), 1);
        assert_eq!(history.sessions[0].files_moved, 2);
    }

    #[test]
    fn load_without_journal_is_none() {
        let tmp = TempDir::new().unwrap();
        let folder = tmp.path().join("watched");
        fs::create_dir(&folder).unwrap();
        let store = store_in(&tmp, 10);

        assert!(store.load(&folder).unwrap().is_none());
        assert!(store.summaries(&folder).unwrap().is_empty());
    }

    #[test]
    fn retention_cap_applies_across_runs() {
        let tmp = TempDir::new().unwrap();
        let folder = tmp.path().join("watched");
        fs::create_dir(&folder).unwrap();
        let store = store_in(&tmp, 2);

        for files in 1..=3 {
            store
                .record_session(&folder, session_for(&folder, files))
                .unwrap();
        }

        let history = store.load(&folder).unwrap().unwrap();
        assert_eq!(history.sessions.len(), 2);
        assert_eq!(history.sessions[0].files_moved, 3);
        assert_eq!(history.sessions[1].files_moved, 2);
    }

    #[test]
    fn missing_folder_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp, 10);
        let err = store.load(&tmp.path().join("gone")).unwrap_err();
        assert!(matches!(err, AppError::NotADirectory { .. }));
    }

    #[test]
    fn corrupt_journal_does_not_block_new_sessions() {
        let tmp = TempDir::new().unwrap();
        let folder = tmp.path().join("watched");
        fs::create_dir(&folder).unwrap();
        let store = store_in(&tmp, 10);

        store
            .record_session(&folder, session_for(&folder, 1))
            .unwrap();
        let key = store.folder_key(&folder).unwrap();
        fs::write(store.journal_path(&key), b"{ not json").unwrap();

        store
            .record_session(&folder, session_for(&folder, 5))
            .unwrap();
        let history = store.load(&folder).unwrap().unwrap();
        assert_eq!(history.sessions.len(), 1);
        assert_eq!(history.sessions[0].files_moved, 5);
    }

    #[test]
    fn save_persists_undone_flags() {
        let tmp = TempDir::new().unwrap();
        let folder = tmp.path().join("watched");
        fs::create_dir(&folder).unwrap();
        let store = store_in(&tmp, 10);

        store
            .record_session(&folder, session_for(&folder, 1))
            .unwrap();
        let mut history = store.load(&folder).unwrap().unwrap();
        let id = history.sessions[0].session_id;
        history.mark_undone_through(&id);
        store.save(&folder, &history).unwrap();

        let reloaded = store.load(&folder).unwrap().unwrap();
        assert!(reloaded.sessions[0].undone);
        assert!(reloaded.latest_active().is_none());
    }

    #[test]
    fn journals_for_different_folders_do_not_collide() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        fs::create_dir(&a).unwrap();
        fs::create_dir(&b).unwrap();
        let store = store_in(&tmp, 10);

        store.record_session(&a, session_for(&a, 1)).unwrap();
        store.record_session(&b, session_for(&b, 2)).unwrap();

        assert_eq!(store.load(&a).unwrap().unwrap().sessions[0].files_moved, 1);
        assert_eq!(store.load(&b).unwrap().unwrap().sessions[0].files_moved, 2);
    }
}
