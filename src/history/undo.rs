//! Preflight checks and execution for undoing recorded sessions.
//!
//! Undo walks the session chain newest-first and replays each recorded
//! operation's inverse. Before touching anything it verifies the moved
//! files are still where the session left them, unchanged, and that their
//! original locations are free. Category folders are only removed when
//! empty; folders that gained content are reported and left alone.

use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::organize::move_file;

use super::checksum::compute_file_checksum;
use super::entry::{FolderHistory, OperationRecord, OrganizeSession, RecordedOperation};
use super::store::HistoryStore;

/// Why an operation cannot be undone cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictType {
    /// File content changed since the session moved it.
    Modified,
    /// File is no longer at its organized location.
    Deleted,
    /// Something now occupies the original location.
    Blocking,
}

#[derive(Debug, Clone)]
pub struct ConflictInfo {
    pub path: PathBuf,
    pub conflict: ConflictType,
    pub detail: String,
}

/// Result of checking a session chain before undoing it.
#[derive(Debug)]
pub struct UndoPreflight {
    pub target_session: Uuid,
    pub sessions: usize,
    pub total_operations: usize,
    pub conflicts: Vec<ConflictInfo>,
}

impl UndoPreflight {
    pub fn clean(&self) -> bool {
        self.conflicts.is_empty()
    }
}

/// Outcome of an executed undo.
#[derive(Debug, Default)]
pub struct UndoOutcome {
    pub sessions_reverted: usize,
    pub operations_undone: usize,
    pub operations_skipped: usize,
    /// Category folders left in place because they were not empty.
    pub folders_kept: Vec<PathBuf>,
    pub errors: Vec<String>,
}

impl UndoOutcome {
    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check the chain ending at `requested` (newest active session if `None`)
/// without changing anything.
pub fn preflight(
    store: &HistoryStore,
    folder: &Path,
    requested: Option<Uuid>,
) -> Result<UndoPreflight> {
    let history = load_history(store, folder)?;
    let target = resolve_target(&history, requested)?;
    let chain = chain_for(&history, &target);

    let mut conflicts = Vec::new();
    let mut total_operations = 0;
    for session in &chain {
        for op in session.operations.iter().rev() {
            total_operations += 1;
            check_operation(op, &mut conflicts);
        }
    }

    Ok(UndoPreflight {
        target_session: target,
        sessions: chain.len(),
        total_operations,
        conflicts,
    })
}

/// Revert the chain ending at `requested` (newest active session if `None`).
///
/// Without `force` the first conflict aborts and nothing is marked undone.
/// With `force`, conflicted operations are skipped and the rest proceed.
/// Completed runs flag their sessions as undone in the journal.
pub fn execute_undo(
    store: &HistoryStore,
    folder: &Path,
    requested: Option<Uuid>,
    force: bool,
) -> Result<UndoOutcome> {
    let mut history = load_history(store, folder)?;
    let target = resolve_target(&history, requested)?;
    let chain: Vec<OrganizeSession> = chain_for(&history, &target)
        .into_iter()
        .cloned()
        .collect();
    let scope = folder
        .canonicalize()
        .map_err(|_| AppError::not_a_directory(folder))?;

    let mut outcome = UndoOutcome::default();
    for session in &chain {
        for op in session.operations.iter().rev() {
            if let Err(e) = validate_scope(&scope, op) {
                outcome.errors.push(e.to_string());
                return Ok(outcome);
            }

            let mut conflicts = Vec::new();
            check_operation(op, &mut conflicts);
            if let Some(conflict) = conflicts.first() {
                if force {
                    tracing::warn!(
                        path = %conflict.path.display(),
                        "skipping conflicted operation: {}",
                        conflict.detail
                    );
                    outcome.operations_skipped += 1;
                    continue;
                }
                outcome.errors.push(format!(
                    "{}: {}",
                    conflict.path.display(),
                    conflict.detail
                ));
                return Ok(outcome);
            }

            match apply_undo(op, &mut outcome) {
                Ok(()) => outcome.operations_undone += 1,
                Err(e) => {
                    let message = format!("could not undo {}: {e}", op.undo_operation.describe());
                    if force {
                        tracing::warn!("{message}");
                        outcome.errors.push(message);
                        outcome.operations_skipped += 1;
                    } else {
                        outcome.errors.push(message);
                        return Ok(outcome);
                    }
                }
            }
        }
        outcome.sessions_reverted += 1;
    }

    history.mark_undone_through(&target);
    store.save(folder, &history)?;
    Ok(outcome)
}

fn load_history(store: &HistoryStore, folder: &Path) -> Result<FolderHistory> {
    store.load(folder)?.ok_or_else(|| AppError::NoHistory {
        path: folder.display().to_string(),
    })
}

fn resolve_target(history: &FolderHistory, requested: Option<Uuid>) -> Result<Uuid> {
    match requested {
        Some(id) => {
            let session = history
                .find_session(&id)
                .ok_or_else(|| AppError::SessionNotFound {
                    session_id: id.to_string(),
                })?;
            if session.undone {
                return Err(AppError::history(format!("session {id} is already undone")));
            }
            Ok(id)
        }
        None => history
            .latest_active()
            .map(|s| s.session_id)
            .ok_or_else(|| AppError::history("nothing left to undo")),
    }
}

fn chain_for<'a>(history: &'a FolderHistory, target: &Uuid) -> Vec<&'a OrganizeSession> {
    history.sessions_through(target).unwrap_or_default()
}

/// Flag anything that would make replaying this operation's inverse unsafe.
fn check_operation(op: &RecordedOperation, conflicts: &mut Vec<ConflictInfo>) {
    let OperationRecord::Move {
        source,
        destination,
    } = &op.operation
    else {
        // Folder creates and deletes are reverted best-effort.
        return;
    };

    if !destination.exists() {
        conflicts.push(ConflictInfo {
            path: destination.clone(),
            conflict: ConflictType::Deleted,
            detail: "file is no longer at its organized location".into(),
        });
        return;
    }

    if let Some(expected) = &op.checksum {
        match compute_file_checksum(destination) {
            Ok(current) if current.sha256 != expected.sha256 => {
                conflicts.push(ConflictInfo {
                    path: destination.clone(),
                    conflict: ConflictType::Modified,
                    detail: "file changed since it was organized".into(),
                });
            }
            Err(e) => {
                conflicts.push(ConflictInfo {
                    path: destination.clone(),
                    conflict: ConflictType::Modified,
                    detail: format!("could not verify file: {e}"),
                });
            }
            _ => {}
        }
    }

    if source.exists() {
        conflicts.push(ConflictInfo {
            path: source.clone(),
            conflict: ConflictType::Blocking,
            detail: "original location is occupied".into(),
        });
    }
}

/// Recorded paths must stay inside the folder being reverted.
fn validate_scope(scope: &Path, op: &RecordedOperation) -> Result<()> {
    let paths: Vec<&PathBuf> = match &op.operation {
        OperationRecord::Move {
            source,
            destination,
        } => vec![source, destination],
        OperationRecord::CreateFolder { path } | OperationRecord::DeleteFolder { path } => {
            vec![path]
        }
    };
    for path in paths {
        if !path.starts_with(scope) {
            return Err(AppError::history(format!(
                "refusing to touch {} outside {}",
                path.display(),
                scope.display()
            )));
        }
    }
    Ok(())
}

fn apply_undo(op: &RecordedOperation, outcome: &mut UndoOutcome) -> std::io::Result<()> {
    match &op.undo_operation {
        OperationRecord::Move {
            source,
            destination,
        } => move_file(source, destination),
        OperationRecord::DeleteFolder { path } => {
            match fs::remove_dir(path) {
                Ok(()) => Ok(()),
                Err(_) if !path.exists() => Ok(()),
                Err(_) => {
                    // Folder gained content since the session; leave it.
                    outcome.folders_kept.push(path.clone());
                    Ok(())
                }
            }
        }
        OperationRecord::CreateFolder { path } => fs::create_dir_all(path),
    }
}
