//! Records kept per organize session so a run can be undone later.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Bump when the on-disk journal layout changes.
pub const HISTORY_SCHEMA_VERSION: u32 = 1;

/// Sessions kept per folder before the oldest are dropped.
pub const DEFAULT_MAX_SESSIONS: usize = 10;

/// A single reversible file system action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OperationRecord {
    Move {
        source: PathBuf,
        destination: PathBuf,
    },
    CreateFolder {
        path: PathBuf,
    },
    DeleteFolder {
        path: PathBuf,
    },
}

impl OperationRecord {
    /// The action that reverts this one.
    pub fn inverse(&self) -> Self {
        match self {
            Self::Move {
                source,
                destination,
            } => Self::Move {
                source: destination.clone(),
                destination: source.clone(),
            },
            Self::CreateFolder { path } => Self::DeleteFolder { path: path.clone() },
            Self::DeleteFolder { path } => Self::CreateFolder { path: path.clone() },
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Move {
                source,
                destination,
            } => format!("move {} -> {}", source.display(), destination.display()),
            Self::CreateFolder { path } => format!("create folder {}", path.display()),
            Self::DeleteFolder { path } => format!("delete folder {}", path.display()),
        }
    }
}

/// Integrity snapshot of a moved file, taken right after the move landed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileChecksum {
    pub sha256: String,
    pub size: u64,
    /// Modification time, seconds since the Unix epoch.
    pub modified: u64,
}

/// One applied operation plus everything needed to verify and revert it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedOperation {
    pub id: Uuid,
    /// 1-based position within the session.
    pub sequence: u32,
    pub operation: OperationRecord,
    pub undo_operation: OperationRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<FileChecksum>,
}

impl RecordedOperation {
    pub fn new(sequence: u32, operation: OperationRecord, checksum: Option<FileChecksum>) -> Self {
        let undo_operation = operation.inverse();
        Self {
            id: Uuid::new_v4(),
            sequence,
            operation,
            undo_operation,
            checksum,
        }
    }
}

/// One organize run against a folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizeSession {
    pub session_id: Uuid,
    pub executed_at: DateTime<Utc>,
    pub target_folder: String,
    pub files_moved: usize,
    pub operations: Vec<RecordedOperation>,
    #[serde(default)]
    pub undone: bool,
}

impl OrganizeSession {
    pub fn new(
        target_folder: impl Into<String>,
        files_moved: usize,
        operations: Vec<RecordedOperation>,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            executed_at: Utc::now(),
            target_folder: target_folder.into(),
            files_moved,
            operations,
            undone: false,
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.session_id,
            executed_at: self.executed_at,
            files_moved: self.files_moved,
            operation_count: self.operations.len(),
            undone: self.undone,
        }
    }
}

/// Listing row for the `history` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub executed_at: DateTime<Utc>,
    pub files_moved: usize,
    pub operation_count: usize,
    pub undone: bool,
}

/// Everything recorded for one folder. Sessions are kept newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderHistory {
    pub version: u32,
    pub folder_path: String,
    pub sessions: Vec<OrganizeSession>,
    pub last_updated: DateTime<Utc>,
}

impl FolderHistory {
    pub fn new(folder_path: impl Into<String>) -> Self {
        Self {
            version: HISTORY_SCHEMA_VERSION,
            folder_path: folder_path.into(),
            sessions: Vec::new(),
            last_updated: Utc::now(),
        }
    }

    /// Insert a session at the front and drop the oldest past the cap.
    pub fn add_session(&mut self, session: OrganizeSession, max_sessions: usize) {
        self.sessions.insert(0, session);
        self.sessions.truncate(max_sessions.max(1));
        self.last_updated = Utc::now();
    }

    pub fn find_session(&self, session_id: &Uuid) -> Option<&OrganizeSession> {
        self.sessions.iter().find(|s| s.session_id == *session_id)
    }

    /// Newest session that has not been undone yet.
    pub fn latest_active(&self) -> Option<&OrganizeSession> {
        self.sessions.iter().find(|s| !s.undone)
    }

    /// Sessions to revert, newest first, to unwind through `target`.
    /// Already-undone sessions in between are passed over. `None` when the
    /// id is not in this history.
    pub fn sessions_through(&self, target: &Uuid) -> Option<Vec<&OrganizeSession>> {
        let end = self
            .sessions
            .iter()
            .position(|s| s.session_id == *target)?;
        Some(
            self.sessions[..=end]
                .iter()
                .filter(|s| !s.undone)
                .collect(),
        )
    }

    /// Flag every session down to and including `target` as undone.
    pub fn mark_undone_through(&mut self, target: &Uuid) {
        if let Some(end) = self.sessions.iter().position(|s| s.session_id == *target) {
            for session in &mut self.sessions[..=end] {
                session.undone = true;
            }
            self.last_updated = Utc::now();
        }
    }

    pub fn summaries(&self) -> Vec<SessionSummary> {
        self.sessions.iter().map(OrganizeSession::summary).collect()
    }
}
