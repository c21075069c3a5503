//! Per-folder journal of organize sessions and the undo machinery on top.

mod checksum;
mod entry;
mod store;
mod undo;

pub use checksum::{compute_file_checksum, hash_folder_path};
pub use entry::{
    FileChecksum, FolderHistory, OperationRecord, OrganizeSession, RecordedOperation,
    SessionSummary, DEFAULT_MAX_SESSIONS, HISTORY_SCHEMA_VERSION,
};
pub use store::HistoryStore;
pub use undo::{
    execute_undo, preflight, ConflictInfo, ConflictType, UndoOutcome, UndoPreflight,
};
